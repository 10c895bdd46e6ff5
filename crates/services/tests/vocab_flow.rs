use std::sync::Arc;

use chrono::Duration;
use services::{Clock, VocabService};
use storage::repository::{InMemoryStore, VocabRepository};
use vocab_core::model::Language;
use vocab_core::time::fixed_now;

fn service_at(clock: Clock) -> VocabService {
    VocabService::new(clock, Arc::new(InMemoryStore::new()))
}

fn repo(store: &Arc<InMemoryStore>) -> Arc<dyn VocabRepository> {
    store.clone()
}

#[tokio::test]
async fn add_learn_delete_flow_updates_progress() {
    let svc = service_at(Clock::fixed(fixed_now()));

    let haus = svc
        .add_word("Haus", "house", Language::German, 2)
        .await
        .unwrap();
    svc.add_word("Baum", "tree", Language::German, 1)
        .await
        .unwrap();

    let words = svc.all_words().await.unwrap();
    assert_eq!(words.len(), 2);

    svc.mark_learned(haus).await.unwrap();
    let progress = svc.progress().await.unwrap();
    assert_eq!(progress.total_words, 2);
    assert_eq!(progress.learned_words, 1);
    assert_eq!(progress.progress_percentage(), 50.0);

    svc.remove_word(haus).await.unwrap();
    let progress = svc.progress().await.unwrap();
    assert_eq!(progress.total_words, 1);
    assert_eq!(progress.learned_words, 0);
}

#[tokio::test]
async fn daily_stats_reflect_added_words_and_current_learned_state() {
    let svc = service_at(Clock::fixed(fixed_now()));

    let stats = svc.daily_stats(7).await.unwrap();
    assert!(stats.is_empty());

    let id = svc
        .add_word("gato", "cat", Language::Spanish, 1)
        .await
        .unwrap();
    let stats = svc.daily_stats(7).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].date, fixed_now().date_naive());
    assert_eq!(stats[0].added, 1);
    assert_eq!(stats[0].learned, 0);

    svc.mark_learned(id).await.unwrap();
    let stats = svc.daily_stats(7).await.unwrap();
    assert_eq!(stats[0].learned, 1);
}

#[tokio::test]
async fn streak_builds_across_daily_sessions() {
    // one shared store, a fresh service per "day" to move the clock
    let store = Arc::new(InMemoryStore::new());
    let mut ids = Vec::new();
    for (i, word) in ["un", "deux", "trois"].iter().enumerate() {
        let svc = VocabService::new(Clock::fixed(fixed_now()), repo(&store));
        let id = svc
            .add_word(word, &format!("number {i}"), Language::French, 1)
            .await
            .unwrap();
        ids.push(id);
    }

    for (day, id) in ids.iter().enumerate() {
        let at = fixed_now() + Duration::days(day as i64);
        let svc = VocabService::new(Clock::fixed(at), repo(&store));
        svc.mark_learned(*id).await.unwrap();
    }

    let svc = VocabService::new(Clock::fixed(fixed_now()), repo(&store));
    let progress = svc.progress().await.unwrap();
    // day one sets last_active only; days two and three each extend the streak
    assert_eq!(progress.streak_days, 2);
    assert_eq!(progress.learned_words, 3);
}

#[tokio::test]
async fn words_by_language_only_returns_that_language() {
    let svc = service_at(Clock::fixed(fixed_now()));
    svc.add_word("gato", "cat", Language::Spanish, 2)
        .await
        .unwrap();
    svc.add_word("perro", "dog", Language::Spanish, 5)
        .await
        .unwrap();
    svc.add_word("Katze", "cat", Language::German, 3)
        .await
        .unwrap();

    let spanish = svc.words_by_language(Language::Spanish).await.unwrap();
    assert_eq!(spanish.len(), 2);
    assert_eq!(spanish[0].word, "perro"); // hardest first
    assert!(svc
        .words_by_language(Language::Chinese)
        .await
        .unwrap()
        .is_empty());
}

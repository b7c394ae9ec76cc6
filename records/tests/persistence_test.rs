//! Repository persistence integration tests over the file store

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use records::{
    BlobStore, Colony, ColonyLog, ColonyRepository, DifficultyLevel, Expense, ExpenseCategory,
    ExpenseRepository, FavoriteItem, FavoriteType, FavoritesRepository, FileStore, GuideCategory,
    LoadOrigin, LogActivity, SetupGuide, SetupGuideRepository, SetupStep, Species,
    SpeciesRepository,
};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::open(dir.path()).unwrap())
}

#[test]
fn test_added_entity_survives_reload() {
    let dir = TempDir::new().unwrap();
    let date = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
    let expense = Expense::new(12.75, "Outworld tubing", ExpenseCategory::Housing, date)
        .unwrap()
        .with_notes("6mm");

    {
        let mut repo = ExpenseRepository::open(file_store(&dir));
        repo.add(expense.clone());
        assert_eq!(repo.get(expense.id), Some(&expense));
    }

    let reopened = ExpenseRepository::open(file_store(&dir));
    assert_eq!(reopened.origin(), LoadOrigin::Decoded);
    assert_eq!(reopened.get(expense.id), Some(&expense));
}

#[test]
fn test_colony_logs_survive_reload() {
    let dir = TempDir::new().unwrap();
    let founded = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let colony = Colony::new("Delta", "Tetramorium", founded);
    let id = colony.id;

    {
        let mut repo = ColonyRepository::open(file_store(&dir));
        repo.add(colony);
        repo.add_log(id, ColonyLog::new(founded, LogActivity::Feeding, "fruit fly"));
    }

    let reopened = ColonyRepository::open(file_store(&dir));
    let stored = reopened.get(id).unwrap();
    assert_eq!(stored.last_fed, Some(founded));
    assert_eq!(stored.logs[0].notes, "fruit fly");
}

#[test]
fn test_corrupt_blob_is_replaced_by_defaults() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set("ant_species_data", b"{not json").unwrap();

    let repo = SpeciesRepository::open(store.clone());
    assert_eq!(repo.origin(), LoadOrigin::Defaults);
    assert_eq!(repo.len(), 2);

    let raw = store.get("ant_species_data").unwrap().unwrap();
    let stored: Vec<Species> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(stored, repo.all());
}

#[test]
fn test_empty_array_is_a_valid_collection() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set("colonies_data", b"[]").unwrap();

    let repo = ColonyRepository::open(store);
    assert_eq!(repo.origin(), LoadOrigin::Decoded);
    assert!(repo.is_empty());
}

#[test]
fn test_duplicate_favorites_are_both_stored() {
    let dir = TempDir::new().unwrap();
    let now = Utc::now();
    let mut repo = FavoritesRepository::open(file_store(&dir));
    let before = repo.len();

    for _ in 0..2 {
        repo.add(FavoriteItem::new(FavoriteType::Species, "Ant", "", "abc", now));
    }

    assert_eq!(repo.len(), before + 2);
    assert!(repo.is_favorited("abc", FavoriteType::Species));

    let reopened = FavoritesRepository::open(file_store(&dir));
    assert_eq!(reopened.by_type(FavoriteType::Species).len(), 2);
}

#[test]
fn test_guide_progress_holds_after_toggles_and_reload() {
    let dir = TempDir::new().unwrap();
    let (guide_id, steps) = {
        let mut repo = SetupGuideRepository::open(file_store(&dir));
        let guide = repo.all()[0].clone();
        let steps: Vec<_> = guide.steps.iter().map(|s| s.id).collect();
        for (step, completed) in [(0, true), (2, true), (0, false), (1, true), (0, true)] {
            assert!(repo.set_step_completion(guide.id, steps[step], completed));
        }
        (guide.id, steps)
    };

    let reopened = SetupGuideRepository::open(file_store(&dir));
    let guide = reopened.get(guide_id).unwrap();
    assert_eq!(guide.completed_steps(), steps.len());
    assert_eq!(guide.progress, 1.0);
    assert!(guide.is_completed);
}

#[test]
fn test_favorite_resolution_may_dangle() {
    let dir = TempDir::new().unwrap();
    let mut species = SpeciesRepository::open(file_store(&dir));
    let mut favorites = FavoritesRepository::open(file_store(&dir));

    let target = species.all()[0].clone();
    favorites.add(FavoriteItem::for_species(&target, Utc::now()));
    species.delete(target.id);

    let favorite = &favorites.all()[0];
    let resolved = favorite.reference_uuid().and_then(|id| species.get(id));
    assert!(resolved.is_none());
    assert!(favorites.is_favorited(&target.id.to_string(), FavoriteType::Species));
}

#[test]
fn test_fractional_values_survive_reload_exactly() {
    let dir = TempDir::new().unwrap();
    let steps = (1..=11)
        .map(|n| SetupStep::new(format!("Step {n}"), "", "circle"))
        .collect();
    let guide = SetupGuide::new(
        "Eleven steps",
        "",
        steps,
        GuideCategory::Maintenance,
        "1 hour",
        DifficultyLevel::Beginner,
    );
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let amounts = [1.0 / 3.0, 2.0 / 13.0, 14.0 / 15.0, 7.0 / 30.0, 0.1 + 0.2];

    let (before, expenses) = {
        let mut guides = SetupGuideRepository::open(file_store(&dir));
        guides.add(guide.clone());
        assert!(guides.set_step_completion(guide.id, guide.steps[0].id, true));

        let mut repo = ExpenseRepository::open(file_store(&dir));
        let expenses: Vec<_> = amounts
            .iter()
            .map(|&amount| Expense::new(amount, "Split order", ExpenseCategory::Food, date).unwrap())
            .collect();
        for expense in &expenses {
            repo.add(expense.clone());
        }
        (guides.get(guide.id).unwrap().clone(), expenses)
    };

    let reopened = SetupGuideRepository::open(file_store(&dir));
    assert_eq!(reopened.get(guide.id), Some(&before));
    assert_eq!(before.progress, 1.0 / 11.0);

    let reopened = ExpenseRepository::open(file_store(&dir));
    for expense in &expenses {
        assert_eq!(reopened.get(expense.id), Some(expense));
    }
}

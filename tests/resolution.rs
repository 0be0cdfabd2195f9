// tests/resolution.rs

//! Identity resolution and version equivalence against fake collaborators.

mod common;

use common::{FakeCatalog, as_dlc, config, installer};
use gogcheck::catalog::CatalogEntry;
use gogcheck::overrides::OverrideConfig;
use gogcheck::resolver::{ResolutionOutcome, SkipReason, UnresolvedReason, resolve};
use gogcheck::title::normalize;
use gogcheck::version::{IndeterminateReason, VersionVerdict, compare};

#[test]
fn test_replacement_then_cleanup_then_numerals() {
    let config = config();
    assert_eq!(normalize("Foo Bar (Spanish)", &config).as_str(), "Foo Bar 2");
    assert_eq!(normalize("Great Game (French)", &config).as_str(), "Great Game");
    assert_eq!(normalize("Heroes III (German)", &config).as_str(), "Heroes 3");
}

#[test]
fn test_normalize_is_idempotent() {
    let config = config();
    for raw in [
        "Foo Bar (Spanish)",
        "Great Game (French)",
        "Heroes  III   Complete",
        "II Worlds",
        "Plain",
    ] {
        let once = normalize(raw, &config);
        let twice = normalize(once.as_str(), &config);
        assert_eq!(once, twice, "not idempotent for {raw:?}");
    }
}

#[test]
fn test_empty_config_only_trims() {
    let config = OverrideConfig::default();
    assert_eq!(normalize("  Heroes III  ", &config).as_str(), "Heroes III");
}

#[test]
fn test_goodies_and_delisted_cost_no_catalog_calls() {
    let config = config();
    let catalog = FakeCatalog::new();

    let goodie = installer("/g/setup_ost_1.0_(1).exe", Some("Soundtrack"), Some("1400000000"), "1.0");
    let delisted = installer("/g/setup_gone_1.0_(1).exe", Some("Gone Game"), None, "1.0");
    let dlc = as_dlc(
        installer("/g/setup_dlc_1.0_(1).exe", Some("Great Game: DLC"), Some("5"), "1.0"),
        "1207658924",
    );

    assert_eq!(
        resolve(&goodie, &config, &catalog),
        ResolutionOutcome::Skipped { reason: SkipReason::Goodie }
    );
    assert_eq!(
        resolve(&delisted, &config, &catalog),
        ResolutionOutcome::Skipped { reason: SkipReason::Delisted }
    );
    assert_eq!(
        resolve(&dlc, &config, &catalog),
        ResolutionOutcome::Skipped { reason: SkipReason::NotBaseGame }
    );
    assert_eq!(catalog.total_calls(), 0);
}

#[test]
fn test_search_by_normalized_title_takes_first_candidate() {
    let config = config();
    let catalog = FakeCatalog::new().with_search(
        "Great Game",
        vec![
            CatalogEntry::new("1207658924", "Great Game").with_version("2.1"),
            CatalogEntry::new("1", "Great Game: Remastered").with_version("9.0"),
        ],
    );

    let meta = installer("/g/setup_great_game_2.0_(100).exe", Some("Great Game (French)"), None, "2.0");
    let outcome = resolve(&meta, &config, &catalog);

    let entry = outcome.entry().expect("resolved");
    assert_eq!(entry.catalog_id, "1207658924");
    assert_eq!(*catalog.searched_titles.lock().unwrap(), vec!["Great Game".to_string()]);

    let verdict = compare(
        &entry.catalog_id,
        meta.local_version().as_deref(),
        entry.remote_version.as_deref(),
        &config,
    );
    assert_eq!(
        verdict,
        VersionVerdict::UpdateAvailable {
            local_version: "2.0".to_string(),
            remote_version: "2.1".to_string(),
        }
    );
}

#[test]
fn test_embedded_id_miss_does_not_search() {
    let config = config();
    let catalog = FakeCatalog::new().with_search(
        "Great Game",
        vec![CatalogEntry::new("1207658924", "Great Game")],
    );
    let meta = installer("/g/setup_great_game_2.0_(100).exe", Some("Great Game"), Some("77"), "2.0");

    assert_eq!(
        resolve(&meta, &config, &catalog),
        ResolutionOutcome::Unresolved { reason: UnresolvedReason::NoCandidates }
    );
    assert_eq!(catalog.title_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_unreachable_catalog() {
    let config = config();
    let catalog = FakeCatalog::unreachable();
    let meta = installer("/g/setup_great_game_2.0_(100).exe", Some("Great Game"), Some("77"), "2.0");

    let outcome = resolve(&meta, &config, &catalog);
    let ResolutionOutcome::Unresolved {
        reason: UnresolvedReason::LookupFailed(detail),
    } = outcome
    else {
        panic!("expected a lookup failure, got {outcome:?}");
    };
    assert!(detail.contains("connection refused"));
}

#[test]
fn test_compare_reflexive_and_symmetric() {
    let config = config();
    for v in ["1.0", "2.0.1a", "v1.0.1-gog", "1.0 hotfix"] {
        assert_eq!(compare("any", Some(v), Some(v), &config), VersionVerdict::UpToDate);
    }

    assert_eq!(
        compare("1207658924", Some("2.0.1"), Some("2.0.1a"), &config),
        compare("1207658924", Some("2.0.1a"), Some("2.0.1"), &config),
    );
    assert_eq!(
        compare("1207658924", Some("2.0.1a"), Some("2.0.1"), &config),
        VersionVerdict::UpToDate
    );
}

#[test]
fn test_missing_version_is_indeterminate() {
    assert_eq!(
        compare("1", Some("1.0"), None, &config()),
        VersionVerdict::Indeterminate {
            reason: IndeterminateReason::MissingVersion
        }
    );
}

use std::collections::{HashMap, HashSet};

use bdl_core::lang::builtins;
use bdl_core::lang::constraints;
use bdl_core::lang::keywords;
use bdl_core::lang::operators;
use bdl_core::lang::packages;
use bdl_core::lang::punctuation;
use bdl_core::lang::types;
use bdl_core::LanguageVersion;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::from_str(&info.canonical.to_ascii_lowercase()),
            Some(info.id),
            "keyword lookup must ignore case: {}",
            info.canonical
        );
        assert_eq!(keywords::as_str(info.id), info.canonical);
        assert!(
            info.canonical.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
            "canonical keyword spelling must be upper-case: {}",
            info.canonical
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }

        for &alias in info.aliases {
            assert_eq!(
                keywords::from_str(alias),
                Some(info.id),
                "keyword alias not resolvable: {}",
                alias
            );
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!("duplicate keyword alias spelling {:?}: {:?} and {:?}", alias, prev, info.id);
            }
        }
    }
}

#[test]
fn keyword_ids_have_exactly_one_entry() {
    let mut ids = HashSet::new();
    for info in keywords::KEYWORDS {
        assert!(ids.insert(info.id), "keyword {:?} registered twice", info.id);
    }
}

#[test]
fn keyword_ids_are_dense() {
    // Keyword bitsets are sized from the registry length and indexed by discriminant.
    for info in keywords::KEYWORDS {
        assert!(
            (info.id as usize) < keywords::KEYWORDS.len(),
            "keyword {:?} has discriminant {} past the registry length {}",
            info.id,
            info.id as usize,
            keywords::KEYWORDS.len()
        );
    }
}

#[test]
fn keyword_versions_never_exceed_latest() {
    for info in keywords::KEYWORDS {
        assert!(
            info.since <= LanguageVersion::LATEST,
            "{} introduced after the latest known version",
            info.canonical
        );
    }
}

#[test]
fn grouping_recovery_words_are_statement_or_module_starts() {
    for info in keywords::KEYWORDS {
        if keywords::recovers_grouping(info.id) && info.id != keywords::KeywordId::Else && info.id != keywords::KeywordId::End
        {
            assert!(
                keywords::starts_statement(info.id) || keywords::starts_module_item(info.id),
                "{} recovers a grouping but starts nothing",
                info.canonical
            );
        }
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in operators::OPERATORS {
        assert_eq!(operators::from_str(info.canonical), Some(info.id));
        assert_eq!(operators::as_str(info.id), info.canonical);
        assert!(seen.insert(info.canonical), "duplicate operator {}", info.canonical);
        for &alias in info.aliases {
            assert_eq!(operators::from_str(alias), Some(info.id));
            assert!(seen.insert(alias), "duplicate operator alias {}", alias);
        }
        assert!(info.canonical.len() <= 2, "operators are at most two characters: {}", info.canonical);
    }
}

#[test]
fn punctuation_spellings_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
        assert!(seen.insert(info.canonical), "duplicate punctuation {}", info.canonical);
        assert!(
            operators::from_str(info.canonical).is_none(),
            "{} is both punctuation and an operator",
            info.canonical
        );
    }
}

#[test]
fn base_types_map_to_data_type_keywords() {
    for info in types::BASE_TYPES {
        assert_eq!(
            keywords::category(info.keyword),
            keywords::KeywordCategory::DataType,
            "{:?} is spelled with a non-type keyword",
            info.id
        );
        assert_eq!(types::from_keyword(info.keyword), Some(info.id));
        assert_eq!(types::from_str(types::as_str(info.id)), Some(info.id));
    }
}

#[test]
fn constraint_groups_start_with_a_trigger() {
    for info in types::BASE_TYPES {
        let Some(constraint) = constraints::constraint_for(info.id) else {
            continue;
        };
        for (index, piece) in constraint.pieces.iter().enumerate() {
            if constraint.is_trigger(index) {
                assert!(piece.optional, "{:?}: group {} trigger must be optional", info.id, piece.group);
            }
            if piece.group == 0 {
                assert!(!piece.optional, "{:?}: mandatory pieces cannot be optional", info.id);
            }
        }
    }
}

#[test]
fn package_types_resolvable_by_qualified_name() {
    let mut seen = HashSet::new();
    for info in packages::PACKAGE_TYPES {
        let qualified = info.qualified_name();
        assert_eq!(packages::from_str(&qualified), Some(info.id), "{qualified}");
        assert_eq!(packages::from_str(&qualified.to_ascii_uppercase()), Some(info.id), "{qualified}");
        assert!(seen.insert(qualified.to_ascii_lowercase()), "duplicate package type {qualified}");
    }
}

#[test]
fn builtin_functions_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in builtins::BUILTIN_FUNCTIONS {
        assert_eq!(builtins::from_str(info.canonical), Some(info.id));
        assert_eq!(builtins::as_str(info.id), info.canonical);
        assert!(seen.insert(info.canonical), "duplicate builtin {}", info.canonical);
        assert!(
            keywords::from_str(info.canonical).is_none(),
            "builtin {} shadows a keyword",
            info.canonical
        );
    }
}

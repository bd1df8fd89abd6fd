// Host-side tests for the element data feed.

use periodic_core::*;

const JSON_FEED: &str = r#"[
  {"atomicNumber": 2, "symbol": "He", "name": "Helium", "atomicMass": 4.0026,
   "category": "noble gas", "group": 18, "period": 1, "state": "gas"},
  {"atomicNumber": 1, "symbol": "H", "name": "Hydrogen", "atomicMass": 1.008,
   "category": "nonmetal", "group": 1, "period": 1, "state": "gas",
   "electronegativity": 2.2, "atomicRadius": 31}
]"#;

const CSV_FEED: &str = "\
atomicNumber,symbol,name,atomicMass,category,group,period,state,atomicRadius
1,H,Hydrogen,1.008,nonmetal,1,1,gas,31
80,Hg,Mercury,200.59,transition metal,12,6,liquid,
118,Og,Oganesson,294,,18,7,,
";

#[test]
fn json_feed_is_sorted_by_atomic_number() {
    let elements = parse_elements_json(JSON_FEED).unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].symbol, "H");
    assert_eq!(elements[1].symbol, "He");
    assert_eq!(elements[0].electronegativity, Some(2.2));
    assert_eq!(elements[0].atomic_radius, Some(31.0));
}

#[test]
fn missing_optional_fields_stay_absent() {
    let elements = parse_elements_json(JSON_FEED).unwrap();
    let he = &elements[1];
    assert_eq!(he.electronegativity, None);
    assert_eq!(he.atomic_radius, None);
    assert_eq!(he.melting_point, None);
    assert_eq!(he.block, None);
}

#[test]
fn csv_feed_parses_with_blanks() {
    let elements = parse_elements_csv(CSV_FEED).unwrap();
    assert_eq!(elements.len(), 3);
    let hg = &elements[1];
    assert_eq!(hg.state, ElementState::Liquid);
    assert_eq!(hg.atomic_radius, None);
    let og = &elements[2];
    assert_eq!(og.category, "unknown");
    assert_eq!(og.state, ElementState::Unknown);
    assert_eq!(og.group, Some(18));
}

#[test]
fn json_falls_back_to_csv() {
    let elements = load_elements(Some("{not json"), Some(CSV_FEED)).unwrap();
    assert_eq!(elements.len(), 3);
    let elements = load_elements(None, Some(CSV_FEED)).unwrap();
    assert_eq!(elements.len(), 3);
    let elements = load_elements(Some(JSON_FEED), Some("garbage")).unwrap();
    assert_eq!(elements.len(), 2);
}

#[test]
fn both_feeds_missing_is_an_error() {
    assert!(matches!(
        load_elements(None, None),
        Err(ElementDataError::Empty)
    ));
    assert!(matches!(
        parse_elements_json("[]"),
        Err(ElementDataError::Empty)
    ));
}

#[test]
fn duplicate_atomic_numbers_are_rejected() {
    let feed = r#"[
      {"atomicNumber": 1, "symbol": "H", "name": "Hydrogen", "atomicMass": 1.008},
      {"atomicNumber": 1, "symbol": "D", "name": "Deuterium", "atomicMass": 2.014}
    ]"#;
    assert!(matches!(
        parse_elements_json(feed),
        Err(ElementDataError::DuplicateAtomicNumber(1))
    ));
}

#[test]
fn out_of_range_atomic_numbers_are_rejected() {
    let feed = r#"[{"atomicNumber": 119, "symbol": "Uue", "name": "Ununennium", "atomicMass": 315}]"#;
    assert!(matches!(
        parse_elements_json(feed),
        Err(ElementDataError::AtomicNumberOutOfRange(119))
    ));
    let feed = r#"[{"atomicNumber": 0, "symbol": "n", "name": "Neutronium", "atomicMass": 1}]"#;
    assert!(matches!(
        parse_elements_json(feed),
        Err(ElementDataError::AtomicNumberOutOfRange(0))
    ));
}

#[test]
fn unrecognised_state_is_unknown() {
    let feed = r#"[{"atomicNumber": 1, "symbol": "H", "name": "Hydrogen",
                    "atomicMass": 1.008, "state": "plasma"}]"#;
    let elements = parse_elements_json(feed).unwrap();
    assert_eq!(elements[0].state, ElementState::Unknown);
}

#[test]
fn builtin_dataset_is_complete() {
    let elements = builtin_elements().unwrap();
    assert_eq!(elements.len(), MAX_ATOMIC_NUMBER as usize);
    for (i, e) in elements.iter().enumerate() {
        assert_eq!(e.atomic_number, i as u32 + 1);
    }
    let hg = &elements[79];
    assert_eq!(hg.symbol, "Hg");
    assert_eq!(hg.state, ElementState::Liquid);
    let la = &elements[56];
    assert_eq!(la.category, "lanthanoid");
    assert_eq!((la.group, la.period), (Some(3), Some(6)));
}

const HYPHENATED_FEED: &str = r#"[
  {"atomicNumber": 2, "symbol": "He", "name": "Helium", "atomicMass": 4.0026,
   "category": "noble-gas", "group": 18, "period": 1, "state": "gas"},
  {"atomicNumber": 3, "symbol": "Li", "name": "Lithium", "atomicMass": 6.94,
   "category": "alkali-metal", "group": 1, "period": 2, "state": "solid"},
  {"atomicNumber": 4, "symbol": "Be", "name": "Beryllium", "atomicMass": 9.0122,
   "category": "alkaline-earth-metal", "group": 2, "period": 2, "state": "solid"},
  {"atomicNumber": 13, "symbol": "Al", "name": "Aluminium", "atomicMass": 26.982,
   "category": "post-transition-metal", "group": 13, "period": 3, "state": "solid"},
  {"atomicNumber": 26, "symbol": "Fe", "name": "Iron", "atomicMass": 55.845,
   "category": "transition-metal", "group": 8, "period": 4, "state": "solid"}
]"#;

#[test]
fn hyphenated_categories_get_category_colors() {
    let elements = parse_elements_json(HYPHENATED_FEED).unwrap();
    let spaced = [
        "noble gas",
        "alkali metal",
        "alkaline earth metal",
        "post-transition metal",
        "transition metal",
    ];
    for (e, name) in elements.iter().zip(spaced) {
        let color = color_for(e, ColorScheme::Category);
        assert_ne!(color, Color::NEUTRAL_GRAY, "{} {:?}", e.symbol, e.category);
        assert_eq!(color, category_color(name));
    }
    assert_eq!(category_key(" Noble-Gas "), "noble gas");
}

#[test]
fn empty_filter_matches_everything() {
    let all = builtin_elements().unwrap();
    let filter = ElementFilter::default();
    assert!(filter.is_empty());
    assert_eq!(filter.apply(&all).len(), 118);
}

#[test]
fn query_matches_name_symbol_or_category_ignoring_case() {
    let all = builtin_elements().unwrap();
    let by_name = ElementFilter {
        query: "IRON".into(),
        ..Default::default()
    };
    let hits: Vec<u32> = by_name.apply(&all).iter().map(|e| e.atomic_number).collect();
    assert_eq!(hits, vec![26]);

    let by_symbol = ElementFilter {
        query: "og".into(),
        ..Default::default()
    };
    assert!(by_symbol.apply(&all).iter().any(|e| e.symbol == "Og"));

    let by_category = ElementFilter {
        query: "halogen".into(),
        ..Default::default()
    };
    assert_eq!(by_category.apply(&all).len(), 5);
}

#[test]
fn facets_combine() {
    let all = builtin_elements().unwrap();
    let gases_in_period_2 = ElementFilter {
        state: Some(ElementState::Gas),
        period: Some(2),
        ..Default::default()
    };
    let symbols: Vec<String> = gases_in_period_2
        .apply(&all)
        .into_iter()
        .map(|e| e.symbol)
        .collect();
    assert_eq!(symbols, vec!["N", "O", "F", "Ne"]);

    let group_18 = ElementFilter {
        group: Some(18),
        category: Some("noble-gas".into()),
        ..Default::default()
    };
    assert_eq!(group_18.apply(&all).len(), 6);
    assert!(!group_18.is_empty());
}

#[test]
fn facets_fall_back_to_table_slot() {
    // no group/period in the record
    let fe = Element::new(26, "Fe", "Iron", 55.845).with_category("transition metal");
    let filter = ElementFilter {
        group: Some(8),
        period: Some(4),
        ..Default::default()
    };
    assert!(filter.matches(&fe));
    let wrong = ElementFilter {
        period: Some(5),
        ..Default::default()
    };
    assert!(!wrong.matches(&fe));
}

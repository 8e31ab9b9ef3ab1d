use ps_impose::*;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_default_modulo_is_one() {
    let specs = parse_specs("0", None, None).unwrap();
    assert_eq!(specs.modulo, 1);
    assert_eq!(specs.pages.len(), 1);
    assert_eq!(specs.pages[0].len(), 1);
    assert!(!specs.any_transform());
    assert!(!specs.flipping);
}

#[test]
fn test_booklet_spec() {
    let specs = parse_specs("4:-3L@.7(21cm,0)+0L@.7(21cm,14.85cm)", None, None).unwrap();
    assert_eq!(specs.modulo, 4);
    assert_eq!(specs.pages_per_cycle(), 1);

    let first = &specs.pages[0][0];
    assert!(first.reversed);
    assert_eq!(first.page_number, 3);
    assert_eq!(first.rotate, 90);
    assert_close(first.scale, 0.7);
    assert_close(first.xoff, 21.0 * 28.346456692913385);
    assert_close(first.yoff, 0.0);

    let second = &specs.pages[0][1];
    assert!(!second.reversed);
    assert_close(second.yoff, 14.85 * 28.346456692913385);
    assert!(specs.any_transform());
}

#[test]
fn test_commas_inside_offsets_do_not_split_pages() {
    let specs = parse_specs("2:0(1in,2in),1(-1in,0)", None, None).unwrap();
    assert_eq!(specs.pages.len(), 2);
    assert_close(specs.pages[0][0].xoff, 72.0);
    assert_close(specs.pages[0][0].yoff, 144.0);
    assert_close(specs.pages[1][0].xoff, -72.0);
}

#[test]
fn test_rotations_add_up_and_normalise() {
    let specs = parse_specs("0LLL", None, None).unwrap();
    assert_eq!(specs.pages[0][0].rotate, 270);

    let specs = parse_specs("0RU", None, None).unwrap();
    assert_eq!(specs.pages[0][0].rotate, 90);

    let specs = parse_specs("0LR", None, None).unwrap();
    assert_eq!(specs.pages[0][0].rotate, 0);
}

#[test]
fn test_flips_toggle() {
    let specs = parse_specs("0H", None, None).unwrap();
    assert!(specs.pages[0][0].hflip);
    assert!(specs.flipping);

    let specs = parse_specs("0HH", None, None).unwrap();
    assert!(!specs.pages[0][0].hflip);
    assert!(!specs.flipping);

    // Flipped both ways is a half turn, and no longer needs the page size
    let specs = parse_specs("0HV", None, None).unwrap();
    let spec = &specs.pages[0][0];
    assert!(!spec.hflip && !spec.vflip);
    assert_eq!(spec.rotate, 180);
    assert!(!specs.flipping);
}

#[test]
fn test_relative_offsets() {
    let specs = parse_specs("0(0.5w,1h)", Some(600.0), Some(800.0)).unwrap();
    assert_close(specs.pages[0][0].xoff, 300.0);
    assert_close(specs.pages[0][0].yoff, 800.0);

    match parse_specs("0(0.5w,0)", None, None) {
        Err(ImposeError::Config(msg)) => assert_eq!(msg, "paper size not set"),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_page_number_must_be_below_modulo() {
    match parse_specs("2:0+2", None, None) {
        Err(ImposeError::Spec(msg)) => assert!(msg.starts_with("bad page specification")),
        other => panic!("Expected Spec error, got {:?}", other),
    }
}

#[test]
fn test_malformed_specs() {
    for text in ["", "foo", "0:0", "x:0", "0@", "0@-1", "0(1,2", "0(1)", "0X", "1-"] {
        let err = parse_specs(text, None, None).unwrap_err();
        assert_eq!(err.exit_code(), 1, "spec {text:?}");
    }
}

#[test]
fn test_page_index() {
    let specs = parse_specs("4:-0+1", None, None).unwrap();
    let reversed = &specs.pages[0][0];
    let forward = &specs.pages[0][1];

    // Cycles run forwards from the start and backwards from the end
    assert_eq!(reversed.page_index(12, 4, 0), 8);
    assert_eq!(forward.page_index(12, 4, 0), 1);
    assert_eq!(reversed.page_index(12, 4, 8), 0);
    assert_eq!(forward.page_index(12, 4, 8), 9);
}

#[test]
fn test_ranges() {
    let ranges = parse_ranges("1-4,_,_2-_1,7,3-").unwrap();
    assert_eq!(ranges.len(), 5);
    assert_eq!((ranges[0].start, ranges[0].end), (1, 4));
    assert!(ranges[1].is_blank());
    assert_eq!((ranges[2].start, ranges[2].end), (-2, -1));
    assert_eq!((ranges[3].start, ranges[3].end), (7, 7));
    assert_eq!((ranges[4].start, ranges[4].end), (3, -1));
}

#[test]
fn test_bad_range_reports_literal() {
    let err = parse_ranges("1-2,x3").unwrap_err();
    assert_eq!(err.to_string(), "`x3' is not a page range");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_dimensions() {
    assert_close(parse_absolute_dimension("72").unwrap(), 72.0);
    assert_close(parse_absolute_dimension("1in").unwrap(), 72.0);
    assert_close(parse_absolute_dimension("10mm").unwrap(), 28.346456692913385);
    assert_close(parse_absolute_dimension("1.5pt").unwrap(), 1.5);
    assert!(matches!(
        parse_absolute_dimension("3furlongs"),
        Err(ImposeError::Dimension(_))
    ));
}

#[test]
fn test_paper_sizes() {
    assert_eq!(parse_paper("a4").unwrap(), PageSize::new(595.0, 842.0));
    assert_eq!(parse_paper("Letter").unwrap(), PageSize::new(612.0, 792.0));
    assert_eq!(parse_paper("10cmx1in").unwrap().height, 72.0);
    match parse_paper("quarto") {
        Err(ImposeError::Dimension(msg)) => assert_eq!(msg, "paper size 'quarto' unknown"),
        other => panic!("Expected Dimension error, got {:?}", other),
    }
}

#[test]
fn test_absolute_offsets() {
    let specs = parse_specs("0(100pt,200pt)", None, None).unwrap();
    assert_eq!(specs.pages.len(), 1);
    assert_eq!(specs.pages[0].len(), 1);
    assert_close(specs.pages[0][0].xoff, 100.0);
    assert_close(specs.pages[0][0].yoff, 200.0);
}

#[test]
fn test_two_placements_on_one_page() {
    let specs = parse_specs("0L(1w,0)+0R(0,1h)", Some(595.0), Some(842.0)).unwrap();
    assert_eq!(specs.pages.len(), 1);

    let [left, right] = specs.pages[0].as_slice() else {
        panic!("Expected two placements");
    };
    assert_eq!(left.rotate, 90);
    assert_eq!(right.rotate, 270);
    assert_close(left.xoff, 595.0);
    assert_close(left.yoff, 0.0);
    assert_close(right.xoff, 0.0);
    assert_close(right.yoff, 842.0);
}

#[test]
fn test_blank_range() {
    let ranges = parse_ranges("_").unwrap();
    assert_eq!(ranges, vec![Range::blank()]);
    let list = PageList::new(0, &ranges, false, false, false).unwrap();
    assert_eq!(list.pages(), &[None]);
}

use ps_impose::*;

const DOC: &str = "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 595 842\n%%Pages: 2\n%%EndComments\n\
                   %%BeginSetup\n%%EndSetup\n%%Page: 1 1\n(one) show showpage\n\
                   %%Page: 2 2\n(two) show showpage\n%%Trailer\n%%EOF\n";

const TWO_UP: &str = "2:0L@.7(21cm,0)+1L@.7(21cm,14.85cm)";

fn transform(
    doc: &str,
    specs: &str,
    options: &TransformOptions,
    selection: &Selection,
) -> Result<(String, TransformStatistics)> {
    let width = options.output_size.map(|size| size.width);
    let height = options.output_size.map(|size| size.height);
    let specs = parse_specs(specs, width, height)?;
    let mut output = Vec::new();
    let stats = rearrange_document(
        doc.as_bytes().to_vec(),
        &mut output,
        &specs,
        options,
        selection,
    )?;
    Ok((String::from_utf8(output).unwrap(), stats))
}

fn a4() -> TransformOptions {
    TransformOptions {
        output_size: Some(PaperSize::A4.size()),
        ..Default::default()
    }
}

#[test]
fn test_identity_copies_document() {
    let (output, stats) = transform(
        DOC,
        "0",
        &TransformOptions::default(),
        &Selection::default(),
    )
    .unwrap();

    assert_eq!(
        output,
        "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 595 842\n%%Pages: 2 0\n%%EndComments\n\
         %%BeginSetup\n%%EndSetup\n%%Page: (1) 1\n(one) show showpage\n\
         %%Page: (2) 2\n(two) show showpage\n%%Trailer\n%%EOF\n"
    );
    assert_eq!(stats.source_pages, 2);
    assert_eq!(stats.output_pages, 2);
    assert_eq!(stats.blank_placements, 0);
}

#[test]
fn test_output_size_rewrites_header() {
    let (output, _) = transform(DOC, "0", &a4(), &Selection::default()).unwrap();

    assert!(output.starts_with(
        "%!PS-Adobe-3.0\n%%DocumentMedia: plain 595 842 0 () ()\n\
         %%BoundingBox: 0 0 595 842\n%%Pages: 2 0\n%%EndComments\n"
    ));
    assert_eq!(output.matches("%%BoundingBox").count(), 1);
    assert!(!output.contains("PStoPS"));
}

#[test]
fn test_reverse_selection() {
    let selection = Selection {
        reverse: true,
        ..Default::default()
    };
    let (output, _) = transform(DOC, "0", &TransformOptions::default(), &selection).unwrap();

    let first = output.find("%%Page: (2) 1\n(two)").unwrap();
    let second = output.find("%%Page: (1) 2\n(one)").unwrap();
    assert!(first < second);
}

#[test]
fn test_two_up_uses_procset() {
    let (output, stats) = transform(DOC, TWO_UP, &a4(), &Selection::default()).unwrap();

    assert_eq!(stats.output_pages, 1);
    assert!(output.contains("%%Pages: 1 0\n"));
    assert!(output.contains("%%EndComments\n%%BeginProcSet: PStoPS 1 15\nuserdict begin\n"));
    assert!(output.contains("end\n%%EndProcSet\n%%BeginSetup\n"));
    assert!(output.contains("matrix invertmatrix put\n%%EndSetup\n"));
    assert!(output.contains("%%Page: (1,2) 1\nuserdict/PStoPSsaved save put\nPStoPSmatrix setmatrix\n"));
    assert!(output.contains("595.275591 0.000000 translate\n90 rotate\n0.700000 dup scale\n"));
    assert_eq!(output.matches("/PStoPSenablepage false def").count(), 1);
    assert_eq!(output.matches("PStoPSxform concat\n").count(), 2);
    assert!(output.contains("PStoPSxform concat\n(one) show showpage\nPStoPSsaved restore\n"));
    assert!(output.contains("PStoPSxform concat\n(two) show showpage\nPStoPSsaved restore\n%%Trailer\n"));
}

#[test]
fn test_reimposing_replaces_procset() {
    let (first, _) = transform(DOC, TWO_UP, &a4(), &Selection::default()).unwrap();
    let (second, stats) = transform(&first, "2:0+1", &a4(), &Selection::default()).unwrap();

    assert_eq!(stats.source_pages, 1);
    assert_eq!(stats.blank_placements, 1);
    assert_eq!(second.matches("%%BeginProcSet: PStoPS").count(), 1);
    assert_eq!(second.matches("matrix invertmatrix put").count(), 1);
    assert!(second.contains("%%Page: (1,*) 1\n"));
}

#[test]
fn test_padding_draws_blank_pages() {
    let (output, stats) = transform(
        DOC,
        "0",
        &TransformOptions::default(),
        &Selection::with_ranges("1,_,2"),
    )
    .unwrap();

    assert_eq!(stats.output_pages, 3);
    assert_eq!(stats.blank_placements, 1);
    assert!(output.contains("%%Page: (*) 2\nshowpage\n%%Page: (2) 3\n"));
}

#[test]
fn test_draw_around_transformed_pages() {
    let options = TransformOptions {
        draw: 1.0,
        ..a4()
    };
    let (output, _) = transform(DOC, "0U(1w,1h)", &options, &Selection::default()).unwrap();

    assert!(output.contains("595.000000 842.000000 translate\n180 rotate\n"));
    assert!(output.contains("gsave clippath 0 setgray 1 setlinewidth stroke grestore\n"));
}

#[test]
fn test_global_scale_and_rotation() {
    let options = TransformOptions {
        scale: 0.5,
        rotate: 90,
        ..a4()
    };
    let (output, _) = transform(DOC, "0", &options, &Selection::default()).unwrap();

    assert!(output.contains("0.000000 0.000000 translate\n90 rotate\n0.500000 dup scale\n"));
}

#[test]
fn test_extreme_global_rotation() {
    let options = TransformOptions {
        rotate: i32::MAX,
        ..a4()
    };
    let (output, _) = transform(DOC, "0L", &options, &Selection::default()).unwrap();

    // i32::MAX is 127 degrees past a whole number of turns
    assert!(output.contains("0.000000 0.000000 translate\n217 rotate\n"));

    let options = TransformOptions {
        rotate: i32::MIN,
        ..a4()
    };
    let (output, _) = transform(DOC, "0R", &options, &Selection::default()).unwrap();
    assert!(output.contains("0.000000 0.000000 translate\n142 rotate\n"));
}

#[test]
fn test_horizontal_flip() {
    let options = TransformOptions {
        output_size: Some(PageSize::new(600.0, 800.0)),
        ..Default::default()
    };
    let (output, _) = transform(DOC, "0H@0.5", &options, &Selection::default()).unwrap();

    assert!(output.contains(
        "PStoPSmatrix setmatrix\n0.000000 0.000000 translate\n\
         [ -1 0 0 1 300 0 ] concat\n0.500000 dup scale\n\
         userdict/PStoPSmatrix matrix currentmatrix put\n"
    ));
}

#[test]
fn test_vertical_flip_after_rotation() {
    let options = TransformOptions {
        output_size: Some(PageSize::new(600.0, 800.0)),
        scale: 0.5,
        ..Default::default()
    };
    let (output, _) = transform(DOC, "0LV@0.5(10,20)", &options, &Selection::default()).unwrap();

    // Flip distance is the page height times both scales
    assert!(output.contains(
        "10.000000 20.000000 translate\n90 rotate\n\
         [ 1 0 0 -1 0 200 ] concat\n0.250000 dup scale\n"
    ));
    assert!(!output.contains("[ -1 0 0 1"));
}

#[test]
fn test_flip_uses_input_size() {
    let options = TransformOptions {
        output_size: Some(PageSize::new(600.0, 800.0)),
        input_size: Some(PageSize::new(300.5, 400.0)),
        ..Default::default()
    };
    let (output, _) = transform(DOC, "0H", &options, &Selection::default()).unwrap();

    assert!(output.contains("0.000000 0.000000 translate\n[ -1 0 0 1 300.5 0 ] concat\n"));
    assert!(!output.contains("dup scale"));
}

#[test]
fn test_document_without_header_comments() {
    let doc = "%!PS-Adobe-3.0\n%%Page: 1 1\n(one) show showpage\n\
               %%Page: 2 2\n(two) show showpage\n%%EOF\n";
    let selection = Selection {
        reverse: true,
        ..Default::default()
    };
    let (output, stats) = transform(doc, "0", &TransformOptions::default(), &selection).unwrap();

    assert_eq!(stats.output_pages, 2);
    assert_eq!(output.matches("%%Page:").count(), 2);
    assert_eq!(
        output,
        "%!PS-Adobe-3.0\n%%Page: (2) 1\n(two) show showpage\n\
         %%Page: (1) 2\n(one) show showpage\n%%EOF\n"
    );
}

#[test]
fn test_document_without_pages() {
    let doc = "%!PS-Adobe-3.0\n%%EndComments\nnewpath\n%%EOF\n";
    let (output, stats) = transform(
        doc,
        "0",
        &TransformOptions::default(),
        &Selection::default(),
    )
    .unwrap();

    assert_eq!(stats.output_pages, 0);
    assert_eq!(output, doc);
}

#[test]
fn test_range_past_end_fails() {
    match transform(
        DOC,
        "0",
        &TransformOptions::default(),
        &Selection::with_ranges("1-3"),
    ) {
        Err(err @ ImposeError::Bounds(_)) => assert_eq!(err.exit_code(), 2),
        other => panic!("Expected Bounds error, got {:?}", other),
    }
}

#[test]
fn test_unknown_file_type() {
    match transform(
        "GIF89a",
        "0",
        &TransformOptions::default(),
        &Selection::default(),
    ) {
        Err(ImposeError::Config(msg)) => assert_eq!(msg, "incompatible file type"),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_invalid_options_rejected() {
    let options = TransformOptions {
        scale: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        transform(DOC, "0", &options, &Selection::default()),
        Err(ImposeError::Config(_))
    ));
}

#[tokio::test]
async fn test_rearrange_bytes() {
    let specs = parse_specs("2:1+0", None, None).unwrap();
    let (output, stats) = rearrange_bytes(
        DOC.as_bytes().to_vec(),
        specs,
        TransformOptions::default(),
        Selection::default(),
    )
    .await
    .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert_eq!(stats.output_pages, 1);
    assert!(output.contains("%%Page: (2,1) 1\n"));
}

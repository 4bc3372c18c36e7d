use crate::*;
use serde_json::json;

fn georgia() -> FontMetrics {
    FontMetrics {
        baseline: 0.0,
        ascent: Some(0.756),
        descent: Some(-0.216),
        x_height: Some(0.48213),
        cap_height: Some(0.693),
        fig_height: Some(0.54),
        tittle_height: Some(0.74),
        round_overshoot: Some(0.71),
        pointed_overshoot: Some(0.703),
        em_top: Some(0.778),
        em_bottom: Some(-0.222),
        em_middle: Some(0.278),
        em_height: Some(1.0),
        bbox_top: None,
        bbox_bottom: None,
        bbox_height: None,
        line_height: Some(1.136),
    }
}

#[test]
fn serialize_rounds_and_omits_undefined_fields() {
    let value = serde_json::to_value(georgia()).unwrap();
    assert_eq!(value["xHeight"], json!(0.482));
    assert_eq!(value["baseline"], json!(0.0));
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("bboxTop"));
    assert!(!obj.contains_key("bboxHeight"));
    assert_eq!(obj.len(), 14);
}

#[test]
fn serialized_keys_follow_canonical_order() {
    let map = georgia().to_map(3);
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    let expected: Vec<_> = FontMetrics::FIELD_NAMES
        .into_iter()
        .filter(|k| !k.starts_with("bbox"))
        .collect();
    assert_eq!(keys, expected);
}

#[test]
fn json_round_trip_preserves_fields_within_precision() {
    let original = georgia();
    let text = original.to_json(3, false).unwrap();
    let parsed = FontMetrics::from_json(&text).unwrap();
    for ((name, a), (_, b)) in original.fields().into_iter().zip(parsed.fields()) {
        match (a, b) {
            (Some(a), Some(b)) => assert!((a - b).abs() <= 0.0005, "{name}: {a} vs {b}"),
            (None, None) => {}
            _ => panic!("{name}: definedness changed across round trip"),
        }
    }
}

#[test]
fn pretty_json_uses_four_space_indent() {
    let text = georgia().to_json(3, true).unwrap();
    assert!(text.starts_with("{\n    \"baseline\": 0.0,"), "{text}");
}

#[test]
fn pretty_and_compact_json_carry_the_same_record() {
    let pretty = georgia().to_json(3, true).unwrap();
    let compact = georgia().to_json(3, false).unwrap();
    let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
    assert_eq!(pretty, compact);
}

#[test]
fn missing_fields_parse_as_undefined() {
    let m = FontMetrics::from_json(r#"{"baseline":0.0,"xHeight":0.5}"#).unwrap();
    assert_eq!(m.x_height, Some(0.5));
    assert_eq!(m.defined_count(), 2);
    assert_eq!(m.line_height, None);
}

#[test]
fn rounding_never_emits_negative_zero() {
    let m = FontMetrics {
        descent: Some(-0.0001),
        ..FontMetrics::default()
    };
    let text = m.to_json(3, false).unwrap();
    assert_eq!(text, r#"{"baseline":0.0,"descent":0.0}"#);
}

#[test]
fn get_reports_undefined_and_unknown_fields() {
    let m = georgia();
    assert_eq!(m.get("capHeight").unwrap(), 0.693);
    assert!(matches!(
        m.get("bboxTop"),
        Err(Error::MetricUnavailable { metric }) if metric == "bboxTop"
    ));
    assert!(m.get("noSuchMetric").is_err());
}

#[test]
fn scaled_multiplies_defined_fields_only() {
    let px = georgia().scaled(100.0);
    assert!((px.cap_height.unwrap() - 69.3).abs() < 1e-9);
    assert!((px.descent.unwrap() + 21.6).abs() < 1e-9);
    assert_eq!(px.bbox_top, None);
}

#[test]
fn centered_baseline_offsets_by_em_middle() {
    let m = georgia();
    let y = m.centered_baseline(200.0, 100.0).unwrap();
    assert!((y - 227.8).abs() < 1e-9);
    assert_eq!(FontMetrics::default().centered_baseline(200.0, 100.0), None);
}

#[test]
fn guide_lines_cover_defined_vertical_metrics() {
    let lines = georgia().guide_lines(100.0, 10.0);
    let names: Vec<_> = lines.iter().map(|(n, _)| *n).collect();
    assert!(names.contains(&"baseline"));
    assert!(names.contains(&"xHeight"));
    assert!(!names.contains(&"emHeight"));
    assert!(!names.contains(&"lineHeight"));
    assert!(!names.contains(&"bboxTop"));
    let cap = lines.iter().find(|(n, _)| *n == "capHeight").unwrap().1;
    assert!((cap - 93.07).abs() < 1e-9);
}

//! Unit tests for tool argument coercion and validation.

use honeybadger_mcp_server::api::faults::FaultOrder;
use honeybadger_mcp_server::mcp::args::Arguments;
use serde_json::{json, Value};

fn args(value: Value) -> Arguments {
    Arguments::from(value.as_object().cloned())
}

// ── Numbers ──────────────────────────────────────────────

#[test]
fn integers_accept_numbers_strings_and_integral_floats() {
    let args = args(json!({"a": 5, "b": "17", "c": 3.0, "d": 2.5, "e": "abc", "f": null}));

    assert_eq!(args.optional_int("a"), Some(5));
    assert_eq!(args.optional_int("b"), Some(17));
    assert_eq!(args.optional_int("c"), Some(3));
    assert_eq!(args.optional_int("d"), None);
    assert_eq!(args.optional_int("e"), None);
    assert_eq!(args.optional_int("f"), None);
    assert_eq!(args.get_int("missing", 9), 9);
}

#[test]
fn require_int_treats_zero_as_missing() {
    let args = args(json!({"project_id": 0}));
    let err = args.require_int("project_id").expect_err("zero is missing");
    assert_eq!(err.to_string(), "project_id is required");
}

#[test]
fn int_in_range_reports_bounds() {
    let args = args(json!({"limit": 26, "page": 0, "ok": 10}));

    assert_eq!(
        args.int_in_range("limit", 1, Some(25)).expect_err("too big").to_string(),
        "limit must be between 1 and 25"
    );
    assert_eq!(
        args.int_in_range("page", 1, None).expect_err("too small").to_string(),
        "page must be at least 1"
    );
    assert_eq!(args.int_in_range("ok", 1, Some(25)).expect("in range"), Some(10));
    assert_eq!(args.int_in_range("absent", 1, Some(25)).expect("absent"), None);
}

// ── Strings and booleans ─────────────────────────────────

#[test]
fn empty_strings_count_as_absent() {
    let args = args(json!({"q": "", "id": 12, "flag": true}));

    assert_eq!(args.optional_string("q"), None);
    assert_eq!(args.optional_string("id").as_deref(), Some("12"));
    assert_eq!(args.optional_string("flag").as_deref(), Some("true"));
    assert!(args.require_string("q").is_err());
}

#[test]
fn booleans_accept_string_spellings() {
    let args = args(json!({"a": true, "b": "false", "c": "maybe"}));

    assert_eq!(args.optional_bool("a"), Some(true));
    assert_eq!(args.optional_bool("b"), Some(false));
    assert_eq!(args.optional_bool("c"), None);
    assert!(args.get_bool("c", true));
}

#[test]
fn one_of_parses_allowed_values() {
    let args = args(json!({"order": "frequent", "bad": "oldest"}));

    let order: Option<FaultOrder> = args.one_of("order", &FaultOrder::ALL).expect("allowed");
    assert_eq!(order, Some(FaultOrder::Frequent));

    let err = args
        .one_of::<FaultOrder>("bad", &FaultOrder::ALL)
        .expect_err("not allowed");
    assert_eq!(err.to_string(), "bad must be one of: recent, frequent");
}

// ── JSON parameters ──────────────────────────────────────

#[test]
fn json_parameters_decode_strings() {
    let args = args(json!({
        "widgets": "[{\"type\":\"insights_vis\"}]",
        "structured": {"type": "alert_on_count"},
        "broken": "{nope",
        "blank": " "
    }));

    assert_eq!(
        args.json("widgets").expect("valid"),
        Some(json!([{"type": "insights_vis"}]))
    );
    assert_eq!(
        args.json("structured").expect("passthrough"),
        Some(json!({"type": "alert_on_count"}))
    );
    assert_eq!(args.json("blank").expect("blank"), None);
    assert!(args
        .json("broken")
        .expect_err("malformed")
        .to_string()
        .starts_with("Failed to parse broken JSON:"));
    assert_eq!(
        args.require_json("absent").expect_err("missing").to_string(),
        "absent is required"
    );
}

// ── Timestamps ───────────────────────────────────────────

#[test]
fn unix_seconds_accepts_several_forms() {
    let args = args(json!({
        "number": 1_700_000_000,
        "text": "1700000000",
        "rfc": "2024-01-01T00:00:00Z",
        "offset": "2024-01-01T02:00:00+02:00",
        "junk": "yesterday"
    }));

    assert_eq!(args.unix_seconds("number"), Some(1_700_000_000));
    assert_eq!(args.unix_seconds("text"), Some(1_700_000_000));
    assert_eq!(args.unix_seconds("rfc"), Some(1_704_067_200));
    assert_eq!(args.unix_seconds("offset"), Some(1_704_067_200));
    assert_eq!(args.unix_seconds("junk"), None);
}

#[test]
fn rfc3339_passes_valid_values_through() {
    let args = args(json!({"start": "2024-05-01T10:00:00Z", "stop": "May 1st"}));

    assert_eq!(args.rfc3339("start").as_deref(), Some("2024-05-01T10:00:00Z"));
    assert_eq!(args.rfc3339("stop"), None);
}

#[test]
fn empty_arguments_fall_back_to_defaults() {
    let args = Arguments::default();
    assert_eq!(args.optional_string("anything"), None);
    assert_eq!(args.get_int("page", 1), 1);
}

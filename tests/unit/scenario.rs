use super::*;
use crate::render::cpu::CpuBackend;

const TWO_SLOTS: &str = r#"{
  "texture": { "channels": 4, "instance_limit": 2, "property_name": "_ParamTex" },
  "frames": [
    { "ops": [
      { "op": "register", "instance": "a" },
      { "op": "register", "instance": "b" },
      { "op": "register", "instance": "c" },
      { "op": "set_float", "instance": "a", "channel": 0, "value": 0.5 }
    ] },
    { "ops": [
      { "op": "unregister", "instance": "a" },
      { "op": "register", "instance": "c" },
      { "op": "set_float", "instance": "c", "channel": 0, "value": 1.0 }
    ] }
  ]
}"#;

#[test]
fn parses_tagged_ops() {
    let s = Scenario::from_json_str(TWO_SLOTS).unwrap();
    assert_eq!(s.frames.len(), 2);
    assert_eq!(
        s.frames[0].ops[3],
        ScenarioOp::SetFloat {
            instance: "a".to_string(),
            channel: 0,
            value: 0.5
        }
    );
}

#[test]
fn rejects_unknown_fields_and_empty_names() {
    assert!(Scenario::from_json_str(r#"{ "frames": [], "extra": 1 }"#).is_err());
    assert!(
        Scenario::from_json_str(r#"{ "frames": [ { "ops": [ { "op": "register", "instance": "" } ] } ] }"#)
            .is_err()
    );
}

#[test]
fn runs_frames_and_traces_dirty_cells() {
    let s = Scenario::from_json_str(TWO_SLOTS).unwrap();
    let mut backend = CpuBackend::new();
    let run = run_scenario(&s, &mut backend).unwrap();

    assert_eq!(
        run.frames[0].outcomes[2],
        OpOutcome::Registered(Registration::Exhausted)
    );
    assert_eq!(run.frames[0].dirty_before_flush, vec![0]);
    assert_eq!(run.frames[1].dirty_before_flush, vec![0]);
    assert_eq!(run.frames[1].report.cells_written, 1);
    assert_eq!(run.slots["a"], 0);
    assert_eq!(run.slots["b"], 2);
    assert_eq!(run.slots["c"], 1);
    assert_eq!(run.pixels.texel(0, 0), Some([255, 0, 0, 0]));
    assert_eq!(run.pixels.data, run.buffer);
}

#[test]
fn op_on_unknown_instance_fails() {
    let s = Scenario::from_json_str(
        r#"{ "frames": [ { "ops": [ { "op": "set_byte", "instance": "ghost", "channel": 0, "value": 1 } ] } ] }"#,
    )
    .unwrap();
    let err = run_scenario(&s, &mut CpuBackend::new()).unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn empty_scenario_reads_back_blank_texture() {
    let s = Scenario::from_json_str(r#"{ "frames": [ {} ] }"#).unwrap();
    let run = run_scenario(&s, &mut CpuBackend::new()).unwrap();
    assert_eq!(run.frames[0].report.hooks_run, 0);
    assert!(run.pixels.data.iter().all(|&b| b == 0));
    assert_eq!((run.pixels.width, run.pixels.height), (1, 128));
}

#[test]
fn from_path_keeps_io_error_source() {
    let err = Scenario::from_path("target/does-not-exist/scenario.json").unwrap_err();
    assert!(err.to_string().contains("failed to read scenario"));
    let UifxError::Other(inner) = err else {
        panic!("expected an io error, got {err:?}");
    };
    assert!(inner.downcast_ref::<std::io::Error>().is_some());
}

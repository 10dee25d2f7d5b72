//! Encode → decode round trips over well-known events.

use chainconnex_core::{EventCoder, IndexedArgs};
use chainconnex_evm::AbiEventCoder;
use serde_json::{json, Value};

const ERC20_ABI: &str = r#"[
    {"type":"event","name":"Transfer","anonymous":false,"inputs":[
        {"name":"from","type":"address","indexed":true},
        {"name":"to","type":"address","indexed":true},
        {"name":"value","type":"uint256","indexed":false}]},
    {"type":"event","name":"Flag","anonymous":false,"inputs":[
        {"name":"ok","type":"bool","indexed":true},
        {"name":"delta","type":"int64","indexed":true},
        {"name":"tag","type":"bytes32","indexed":true},
        {"name":"note","type":"string","indexed":false}]}
]"#;

fn obj(v: Value) -> IndexedArgs {
    v.as_object().cloned().unwrap_or_default()
}

fn topics_of(coder: &AbiEventCoder, args: &IndexedArgs) -> Vec<String> {
    coder.encode(args).unwrap().into_iter().flatten().collect()
}

#[test]
fn value_type_indexed_args_round_trip() {
    let coder = AbiEventCoder::from_abi_json(ERC20_ABI, "Flag").unwrap();
    let tag = format!("0x{}", "ab".repeat(32));
    let indexed = obj(json!({ "ok": true, "delta": "-42", "tag": tag }));
    let topics = topics_of(&coder, &indexed);
    assert_eq!(topics.len(), 4);

    // ABI encoding of ("hi") as a one-element sequence.
    let data = format!(
        "0x{:064x}{:064x}{}{}",
        32,
        2,
        hex::encode("hi"),
        "0".repeat(60)
    );
    let decoded = coder.decode(&data, &topics).unwrap();
    for (k, v) in &indexed {
        assert_eq!(&decoded[k], v, "field {k}");
    }
    assert_eq!(decoded["note"], json!("hi"));
}

#[test]
fn mixed_case_address_round_trips_lowercase() {
    let coder = AbiEventCoder::from_abi_json(ERC20_ABI, "Transfer").unwrap();
    let from = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    let topics = topics_of(&coder, &obj(json!({ "from": from, "to": from })));
    let decoded = coder.decode(&format!("0x{:064x}", 5), &topics).unwrap();
    assert_eq!(decoded["from"], json!(from.to_lowercase()));
    assert_eq!(decoded["to"], json!(from.to_lowercase()));
}

#[test]
fn empty_args_only_pin_the_selector() {
    let coder = AbiEventCoder::from_abi_json(ERC20_ABI, "Transfer").unwrap();
    let slots = coder.encode(&IndexedArgs::new()).unwrap();
    assert_eq!(slots[0].as_deref(), Some(coder.selector().as_str()));
    assert!(slots[1..].iter().all(Option::is_none));
}

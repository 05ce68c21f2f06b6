//! Tests for structural validation of condition documents.
use serde_json::json;
use taco_blocks::condition::{
    CompoundCondition, ContractCondition, ReturnValueTest, RpcCondition, StandardContractType,
    TimeCondition,
};
use taco_blocks::prelude::*;

fn time(chain: u64) -> ConditionDocument {
    ConditionDocument::Time(TimeCondition::new(
        chain,
        ReturnValueTest::new(Comparator::GreaterThanOrEqual, 1),
    ))
}

#[test]
fn test_compound_rules() {
    let validator = Validator::new();
    assert_eq!(
        validator.validate(&ConditionDocument::compound(Operator::And, vec![])),
        Err(ValidationError::EmptyOperands)
    );
    assert_eq!(
        validator.validate(&ConditionDocument::compound(
            Operator::Not,
            vec![time(1), time(137)]
        )),
        Err(ValidationError::NotArity(2))
    );
    assert!(validator.is_valid(&ConditionDocument::compound(Operator::Not, vec![time(1)])));

    let nested = ConditionDocument::Compound(CompoundCondition {
        operator: Operator::Or,
        operands: vec![
            time(80002),
            ConditionDocument::compound(Operator::And, vec![time(5)]),
        ],
    });
    assert_eq!(
        validator.validate(&nested),
        Err(ValidationError::UnsupportedChain(5))
    );
}

#[test]
fn test_chain_whitelist() {
    let validator = Validator::new();
    for chain in [1, 137, 80002, 11155111] {
        assert!(validator.is_valid(&time(chain)), "chain {}", chain);
    }
    assert_eq!(
        validator.validate(&time(999)),
        Err(ValidationError::UnsupportedChain(999))
    );
}

#[test]
fn test_time_method_must_be_blocktime() {
    let mut doc = TimeCondition::new(1, ReturnValueTest::new(Comparator::Equal, 1));
    doc.method = "timestamp".to_string();
    assert_eq!(
        Validator::new().validate(&ConditionDocument::Time(doc)),
        Err(ValidationError::InvalidTimeMethod("timestamp".to_string()))
    );
}

#[test]
fn test_contract_requires_address_and_method() {
    let contract = ContractCondition {
        chain: 137,
        contract_address: String::new(),
        standard_contract_type: Some(StandardContractType::Erc20),
        method: "balanceOf".to_string(),
        parameters: vec![json!(":userAddress")],
        function_abi: None,
        return_value_test: ReturnValueTest::new(Comparator::GreaterThan, 0),
    };
    let validator = Validator::new();
    assert_eq!(
        validator.validate(&ConditionDocument::Contract(contract.clone())),
        Err(ValidationError::MissingField {
            condition: "contract",
            field: "contractAddress"
        })
    );

    let without_method = ContractCondition {
        contract_address: "0x8a6D59c1C0449cCF26d87bD52Be029eC4a5afa5c".to_string(),
        method: " ".to_string(),
        ..contract
    };
    assert_eq!(
        validator.validate(&ConditionDocument::Contract(without_method)),
        Err(ValidationError::MissingField {
            condition: "contract",
            field: "method"
        })
    );
}

#[test]
fn test_rpc_parameters_are_fixed() {
    let rpc = RpcCondition {
        chain: 1,
        method: RpcCondition::METHOD.to_string(),
        parameters: RpcCondition::default_parameters(),
        return_value_test: ReturnValueTest::new(Comparator::GreaterThanOrEqual, 5),
    };
    let validator = Validator::new();
    assert!(validator.is_valid(&ConditionDocument::Rpc(rpc.clone())));

    let reordered = RpcCondition {
        parameters: vec![json!("latest"), json!(":userAddress")],
        ..rpc.clone()
    };
    assert_eq!(
        validator.validate(&ConditionDocument::Rpc(reordered)),
        Err(ValidationError::InvalidRpcParameters)
    );

    let wrong_method = RpcCondition {
        method: "eth_call".to_string(),
        ..rpc
    };
    assert_eq!(
        validator.validate(&ConditionDocument::Rpc(wrong_method)),
        Err(ValidationError::InvalidRpcMethod("eth_call".to_string()))
    );
}

#[test]
fn test_validate_json_normalizes() {
    let validator = Validator::new();
    let doc = validator
        .validate_json(&json!({
            "conditionType": "contract",
            "chain": 137,
            "contractAddress": "0x8a6D59c1C0449cCF26d87bD52Be029eC4a5afa5c",
            "standardContractType": "ERC777",
            "method": "balanceOf",
            "parameters": [":userAddress"],
            "returnValueTest": {"comparator": ">", "value": 0}
        }))
        .expect("document validates");
    match doc {
        ConditionDocument::Contract(c) => assert_eq!(c.standard_contract_type, None),
        other => panic!("expected contract, got {:?}", other),
    }

    let compound = validator
        .validate_str(
            r#"{"conditionType":"compound","operator":"or","operands":[
                {"conditionType":"time","chain":1,"method":"blocktime","returnValueTest":{"comparator":">=","value":1}},
                {"conditionType":"json-rpc","endpoint":"https://rpc.example.org","method":"status","returnValueTest":{"comparator":"==","value":"ok"}}
            ]}"#,
        )
        .expect("compound validates");
    assert_eq!(compound.condition_type(), ConditionType::Compound);
}

#[test]
fn test_validate_json_rejections() {
    let validator = Validator::new();
    assert_eq!(
        validator.validate_json(&json!([1, 2])),
        Err(ValidationError::NotAnObject)
    );
    assert_eq!(
        validator.validate_json(&json!({"chain": 1})),
        Err(ValidationError::MissingField {
            condition: "condition",
            field: "conditionType"
        })
    );
    assert_eq!(
        validator.validate_json(&json!({"conditionType": "magic"})),
        Err(ValidationError::UnknownConditionType("magic".to_string()))
    );
    assert_eq!(
        validator.validate_json(&json!({
            "conditionType": "json-rpc",
            "method": "status",
            "returnValueTest": {"comparator": "==", "value": 1}
        })),
        Err(ValidationError::MissingField {
            condition: "json-rpc",
            field: "endpoint"
        })
    );
    assert!(matches!(
        validator.validate_json(&json!({
            "conditionType": "compound",
            "operator": "and",
            "operands": [{"conditionType": "time", "chain": 1}]
        })),
        Err(ValidationError::MissingField { condition: "time", .. })
    ));
    assert!(matches!(
        validator.validate_str("{not json"),
        Err(ValidationError::Malformed(_))
    ));
}

#[test]
fn test_json_rpc_chain_is_whitelisted() {
    let validator = Validator::new();
    let json_rpc = |chain: serde_json::Value| {
        json!({
            "conditionType": "json-rpc",
            "chain": chain,
            "endpoint": "https://example.com",
            "method": "getBalance",
            "returnValueTest": {"comparator": ">=", "value": 0}
        })
    };

    assert_eq!(
        validator.validate_json(&json_rpc(json!(999))),
        Err(ValidationError::UnsupportedChain(999))
    );
    assert!(matches!(
        validator.validate_json(&json_rpc(json!("137"))),
        Err(ValidationError::Malformed(_))
    ));
    assert!(validator.validate_json(&json_rpc(json!(137))).is_ok());

    let nested = json!({
        "conditionType": "compound",
        "operator": "or",
        "operands": [json_rpc(json!(5))]
    });
    assert_eq!(
        validator.validate_json(&nested),
        Err(ValidationError::UnsupportedChain(5))
    );
}

#[test]
fn test_compiled_documents_validate() {
    use taco_blocks::block::palette;

    let mut editor = GraphEditor::new();
    let and = editor
        .attach(&palette::and_operator(), DropTarget::Canvas)
        .expect("and attaches");
    let rpc = editor
        .attach(&palette::eth_balance(), DropTarget::slot(&and, "condition-1"))
        .expect("eth balance attaches");
    editor.set_slot_literal(&rpc, "chain", "80002").expect("literal is set");
    editor.set_slot_literal(&rpc, "minBalance", "1").expect("literal is set");

    let doc = Compiler::default()
        .compile(editor.graph())
        .expect("graph compiles");
    assert_eq!(Validator::new().validate(&doc), Ok(()));
    let reparsed = Validator::new()
        .validate_str(&doc.to_pretty_json())
        .expect("pretty JSON validates");
    assert_eq!(reparsed, doc);
}

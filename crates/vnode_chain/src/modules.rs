use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChainError;

/// Token the referral system pays rewards in (BSC testnet deployment).
pub const REFERRAL_TOKEN: &str = "0x337610d27c682E347C9cD60BD4b3b107C9d34dDd";
/// Referral reward levels, in basis points.
pub const REFERRAL_PERCENTAGES: [u128; 2] = [1000, 2000];

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl FromStr for Address {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChainError::InvalidAddress(s.to_string());
        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.len() != 40 {
            return Err(invalid());
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConstructorArg {
    Address(Address),
    Uint(u128),
    UintArray(Vec<u128>),
    String(String),
    Bool(bool),
}

impl ConstructorArg {
    /// Render the argument the way the deployment tool reads it: addresses as
    /// hex strings, integers as decimal strings so no precision is lost.
    pub fn to_json(&self) -> Value {
        match self {
            ConstructorArg::Address(a) => Value::String(a.to_string()),
            ConstructorArg::Uint(n) => Value::String(n.to_string()),
            ConstructorArg::UintArray(ns) => {
                Value::Array(ns.iter().map(|n| Value::String(n.to_string())).collect())
            }
            ConstructorArg::String(s) => Value::String(s.clone()),
            ConstructorArg::Bool(b) => Value::Bool(*b),
        }
    }

    /// Solidity type name.
    pub fn abi_type(&self) -> &'static str {
        match self {
            ConstructorArg::Address(_) => "address",
            ConstructorArg::Uint(_) => "uint256",
            ConstructorArg::UintArray(_) => "uint256[]",
            ConstructorArg::String(_) => "string",
            ConstructorArg::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Address(a) => write!(f, "{a}"),
            ConstructorArg::Uint(n) => write!(f, "{n}"),
            ConstructorArg::UintArray(ns) => {
                let parts: Vec<String> = ns.iter().map(u128::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ConstructorArg::String(s) => write!(f, "{s:?}"),
            ConstructorArg::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A single contract instantiation inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFuture {
    /// `<module id>#<handle>`
    pub id: String,
    pub handle: String,
    pub contract: String,
    pub args: Vec<ConstructorArg>,
}

/// A named deployment unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentModule {
    pub id: String,
    pub futures: Vec<ContractFuture>,
}

/// Accumulates contract futures and produces a [`DeploymentModule`].
#[derive(Debug)]
pub struct ModuleBuilder {
    id: String,
    futures: Vec<ContractFuture>,
}

impl ModuleBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            futures: Vec::new(),
        }
    }

    /// Declare `contract` to be deployed with `args`; returns the future id.
    pub fn contract(
        &mut self,
        handle: &str,
        contract: &str,
        args: Vec<ConstructorArg>,
    ) -> String {
        let id = format!("{}#{handle}", self.id);
        self.futures.push(ContractFuture {
            id: id.clone(),
            handle: handle.to_string(),
            contract: contract.to_string(),
            args,
        });
        id
    }

    pub fn build(self) -> DeploymentModule {
        DeploymentModule {
            id: self.id,
            futures: self.futures,
        }
    }
}

// ---------------------------------------------------------------------------
// Deployment units
// ---------------------------------------------------------------------------

pub fn vnode_module() -> DeploymentModule {
    let mut m = ModuleBuilder::new("VnodeModule");
    m.contract("vnode", "Vnode", vec![]);
    m.build()
}

pub fn vnode_token_ico_module() -> DeploymentModule {
    let mut m = ModuleBuilder::new("VnodeTokenICOModule");
    m.contract("ico", "VnodeTokenICO", vec![]);
    m.build()
}

pub fn xnode_token_ico_module() -> DeploymentModule {
    let mut m = ModuleBuilder::new("XnodeTokenICOModule");
    m.contract("ico", "XnodeTokenICO", vec![]);
    m.build()
}

pub fn referral_module() -> Result<DeploymentModule, ChainError> {
    let token: Address = REFERRAL_TOKEN.parse()?;
    let mut m = ModuleBuilder::new("ReferralModule");
    m.contract(
        "referral",
        "ReferralSystem",
        vec![
            ConstructorArg::Address(token),
            ConstructorArg::UintArray(REFERRAL_PERCENTAGES.to_vec()),
        ],
    );
    Ok(m.build())
}

/// Every deployment unit, in declaration order.
pub fn registry() -> Result<Vec<DeploymentModule>, ChainError> {
    Ok(vec![
        vnode_module(),
        vnode_token_ico_module(),
        xnode_token_ico_module(),
        referral_module()?,
    ])
}

/// Look a unit up by module id (`ReferralModule`) or contract name
/// (`ReferralSystem`), case-insensitively.
pub fn find_module(name: &str) -> Result<DeploymentModule, ChainError> {
    let modules = registry()?;
    let available = modules
        .iter()
        .map(|m| m.id.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let matches = |m: &DeploymentModule| {
        m.id.eq_ignore_ascii_case(name)
            || m.futures.iter().any(|f| f.contract.eq_ignore_ascii_case(name))
    };

    modules
        .into_iter()
        .find(|m| matches(m))
        .ok_or_else(|| ChainError::UnknownModule {
            name: name.to_string(),
            available,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_unit_has_token_and_percentages() {
        let module = referral_module().unwrap();
        assert_eq!(module.futures.len(), 1);
        let future = &module.futures[0];
        assert_eq!(future.contract, "ReferralSystem");
        assert_eq!(future.id, "ReferralModule#referral");
        assert_eq!(
            future.args,
            vec![
                ConstructorArg::Address(REFERRAL_TOKEN.parse().unwrap()),
                ConstructorArg::UintArray(vec![1000, 2000]),
            ]
        );
    }

    #[test]
    fn parameterless_units_have_empty_args() {
        for (module, contract) in [
            (vnode_module(), "Vnode"),
            (vnode_token_ico_module(), "VnodeTokenICO"),
            (xnode_token_ico_module(), "XnodeTokenICO"),
        ] {
            assert_eq!(module.futures.len(), 1);
            assert_eq!(module.futures[0].contract, contract);
            assert!(module.futures[0].args.is_empty());
        }
    }

    #[test]
    fn registry_ids_are_unique() {
        let modules = registry().unwrap();
        let mut ids: Vec<&str> = modules.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn find_module_by_id_or_contract() {
        assert_eq!(find_module("ReferralModule").unwrap().id, "ReferralModule");
        assert_eq!(find_module("referralsystem").unwrap().id, "ReferralModule");
        assert_eq!(find_module("Vnode").unwrap().id, "VnodeModule");
        assert_eq!(find_module("xnodetokenico").unwrap().id, "XnodeTokenICOModule");
    }

    #[test]
    fn find_module_lists_available_on_miss() {
        let err = find_module("Lock").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Lock"));
        assert!(msg.contains("VnodeModule"));
    }

    #[test]
    fn address_parsing() {
        let addr: Address = REFERRAL_TOKEN.parse().unwrap();
        assert_eq!(addr.to_string(), REFERRAL_TOKEN.to_lowercase());
        assert!("337610d27c682E347C9cD60BD4b3b107C9d34dDd".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!(
            "0xZZ7610d27c682E347C9cD60BD4b3b107C9d34dDd"
                .parse::<Address>()
                .is_err()
        );
    }

    #[test]
    fn args_render_for_deployment_tool() {
        let module = referral_module().unwrap();
        let rendered: Vec<Value> = module.futures[0].args.iter().map(|a| a.to_json()).collect();
        assert_eq!(
            rendered,
            vec![
                serde_json::json!("0x337610d27c682e347c9cd60bd4b3b107c9d34ddd"),
                serde_json::json!(["1000", "2000"]),
            ]
        );
    }

    #[test]
    fn args_display_and_types() {
        let arr = ConstructorArg::UintArray(vec![1000, 2000]);
        assert_eq!(arr.to_string(), "[1000, 2000]");
        assert_eq!(arr.abi_type(), "uint256[]");
        assert_eq!(ConstructorArg::Bool(true).abi_type(), "bool");
        assert_eq!(ConstructorArg::String("x".into()).to_string(), "\"x\"");
    }

    #[test]
    fn builder_assigns_future_ids() {
        let mut m = ModuleBuilder::new("Pair");
        let a = m.contract("a", "A", vec![]);
        let b = m.contract("b", "B", vec![ConstructorArg::Uint(7)]);
        let module = m.build();
        assert_eq!(a, "Pair#a");
        assert_eq!(b, "Pair#b");
        assert_eq!(module.futures.len(), 2);
        assert_eq!(module.futures[1].handle, "b");
        assert_eq!(module.futures[1].args, vec![ConstructorArg::Uint(7)]);
    }
}

/// A chain the condition evaluator is able to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedChain {
    pub id: u64,
    pub name: &'static str,
}

pub const ETHEREUM_MAINNET: u64 = 1;
pub const POLYGON_MAINNET: u64 = 137;
pub const POLYGON_AMOY: u64 = 80002;
pub const SEPOLIA: u64 = 11155111;

/// The fixed whitelist shared by the compiler and the validator.
pub const SUPPORTED_CHAINS: [SupportedChain; 4] = [
    SupportedChain {
        id: ETHEREUM_MAINNET,
        name: "Ethereum Mainnet",
    },
    SupportedChain {
        id: POLYGON_MAINNET,
        name: "Polygon Mainnet",
    },
    SupportedChain {
        id: POLYGON_AMOY,
        name: "Polygon Amoy",
    },
    SupportedChain {
        id: SEPOLIA,
        name: "Sepolia",
    },
];

pub fn is_supported_chain(id: u64) -> bool {
    SUPPORTED_CHAINS.iter().any(|c| c.id == id)
}

pub fn chain_name(id: u64) -> Option<&'static str> {
    SUPPORTED_CHAINS.iter().find(|c| c.id == id).map(|c| c.name)
}

/// Parses a user-typed chain id, returning it only when it is whitelisted.
pub fn parse_chain(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| is_supported_chain(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_whitelist() {
        assert_eq!(parse_chain("137"), Some(137));
        assert_eq!(parse_chain(" 11155111 "), Some(SEPOLIA));
        assert_eq!(parse_chain("999"), None);
        assert_eq!(parse_chain("5001"), None);
        assert_eq!(parse_chain("abc"), None);
        assert_eq!(parse_chain("-1"), None);
        assert_eq!(parse_chain(""), None);
    }

    #[test]
    fn test_chain_name() {
        assert_eq!(chain_name(80002), Some("Polygon Amoy"));
        assert_eq!(chain_name(5), None);
    }
}

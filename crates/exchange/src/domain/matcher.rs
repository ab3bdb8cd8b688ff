//! Resolves the common asset type of the assets two orders exchange.

use {
    model::asset::{AssetClass, AssetData, AssetType},
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Matching strategy for asset classes this crate has no built-in rule for.
///
/// Implementations may match across classes. `left` always has the class the
/// matcher is registered for.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Matcher: Send + Sync {
    fn match_assets(&self, left: &AssetType, right: &AssetType) -> Option<AssetType>;
}

/// Matches a whole collection against any token of it, yielding the concrete
/// token.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionMatcher;

impl Matcher for CollectionMatcher {
    fn match_assets(&self, left: &AssetType, right: &AssetType) -> Option<AssetType> {
        let collection = match left.decode().ok()? {
            AssetData::Collection { token } => token,
            _ => return None,
        };
        let token = match right.decode().ok()? {
            AssetData::Erc721 { token, .. }
            | AssetData::Erc1155 { token, .. }
            | AssetData::Erc721Lazy { token, .. }
            | AssetData::Erc1155Lazy { token, .. } => token,
            _ => return None,
        };
        (collection == token).then(|| right.clone())
    }
}

/// Matches assets of the same class with identical payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn match_assets(&self, left: &AssetType, right: &AssetType) -> Option<AssetType> {
        (left == right).then(|| left.clone())
    }
}

/// Custom matchers by the asset class they handle.
#[derive(Clone, Default)]
pub struct Registry(HashMap<AssetClass, Arc<dyn Matcher>>);

impl Registry {
    /// A registry with the matchers every deployment ships with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(AssetClass::COLLECTION, Arc::new(CollectionMatcher));
        registry
    }

    /// Registers `matcher` for `class`, replacing any earlier registration.
    pub fn register(&mut self, class: AssetClass, matcher: Arc<dyn Matcher>) {
        self.0.insert(class, matcher);
    }

    pub fn get(&self, class: &AssetClass) -> Option<&Arc<dyn Matcher>> {
        self.0.get(class)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct AssetMatcher {
    registry: Registry,
}

impl AssetMatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Returns the asset type both sides agree on, or `None` if the asset
    /// types are incompatible. The result does not depend on the argument
    /// order for the built-in classes.
    pub fn match_assets(&self, left: &AssetType, right: &AssetType) -> Option<AssetType> {
        self.match_one_side(left, right)
            .or_else(|| self.match_one_side(right, left))
    }

    fn match_one_side(&self, left: &AssetType, right: &AssetType) -> Option<AssetType> {
        match left.class {
            AssetClass::ETH => (right.class == AssetClass::ETH).then(AssetType::eth),
            AssetClass::ERC20 | AssetClass::ERC721 | AssetClass::ERC1155 => {
                same_token(left, right).then(|| left.clone())
            }
            AssetClass::ERC721_LAZY | AssetClass::ERC1155_LAZY | AssetClass::BUNDLE => {
                (left == right).then(|| left.clone())
            }
            class => match self.registry.get(&class) {
                Some(matcher) => matcher.match_assets(left, right),
                None => ExactMatcher.match_assets(left, right),
            },
        }
    }
}

/// Compares the decoded payloads so that encodings with trailing bytes still
/// match.
fn same_token(left: &AssetType, right: &AssetType) -> bool {
    if left.class != right.class {
        return false;
    }
    match (left.decode(), right.decode()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

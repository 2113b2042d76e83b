use serde::{Deserialize, Serialize};

/// An external discrete item offered to a mixture, such as a solid to
/// dissolve or a catalyst surface. Tokens are matched by exact id or by tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub tags: Vec<String>,
    pub count: u32,
}

impl Token {
    pub fn new(id: &str, count: u32) -> Self {
        Token {
            id: id.to_owned(),
            tags: Vec::new(),
            count,
        }
    }

    pub fn tagged(id: &str, tags: &[&str], count: u32) -> Self {
        Token {
            id: id.to_owned(),
            tags: tags.iter().map(|&tag| tag.to_owned()).collect(),
            count,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.count == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenMatcher {
    Id(String),
    Tag(String),
}

impl TokenMatcher {
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            TokenMatcher::Id(id) => token.id == *id,
            TokenMatcher::Tag(tag) => token.tags.iter().any(|t| t == tag),
        }
    }
}

/// One token a reaction needs: either consumed per fulfilment or merely
/// required to be present (catalytic).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequirement {
    matcher: TokenMatcher,
    catalyst: bool,
}

impl TokenRequirement {
    pub fn consumed(matcher: TokenMatcher) -> Self {
        TokenRequirement {
            matcher,
            catalyst: false,
        }
    }

    pub fn catalyst(matcher: TokenMatcher) -> Self {
        TokenRequirement {
            matcher,
            catalyst: true,
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.matcher.matches(token)
    }

    pub fn is_catalyst(&self) -> bool {
        self.catalyst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchers() {
        let token = Token::tagged("chem:rock_salt", &["chem:salts"], 3);
        assert!(TokenMatcher::Id("chem:rock_salt".to_owned()).matches(&token));
        assert!(!TokenMatcher::Id("chem:nickel".to_owned()).matches(&token));
        assert!(TokenMatcher::Tag("chem:salts".to_owned()).matches(&token));
        assert!(!TokenMatcher::Tag("chem:metals".to_owned()).matches(&token));
    }
}

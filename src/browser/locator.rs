use std::fmt;

/// How a selector string is matched against the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    Id,
    Name,
    Css,
    Xpath,
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::Css => "css",
            LocatorStrategy::Xpath => "xpath",
        };
        write!(f, "{}", name)
    }
}

/// A (strategy, selector) pair identifying how to find one UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub selector: String,
}

impl Locator {
    pub fn id(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Id,
            selector: selector.into(),
        }
    }

    pub fn name(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Name,
            selector: selector.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Css,
            selector: selector.into(),
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Xpath,
            selector: selector.into(),
        }
    }

    /// JavaScript expression evaluating to the first matching element or null.
    /// Chromiumoxide has no native XPath lookup, so xpath goes through
    /// `document.evaluate`.
    pub fn js_expression(&self) -> String {
        let literal = js_string_literal(&self.selector);
        match self.strategy {
            LocatorStrategy::Id => format!("document.getElementById({})", literal),
            LocatorStrategy::Name => {
                format!("(document.getElementsByName({})[0] || null)", literal)
            }
            LocatorStrategy::Css => format!("document.querySelector({})", literal),
            LocatorStrategy::Xpath => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                literal
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.selector)
    }
}

/// Ordered fallback chain of locators for one logical field. Ordering encodes
/// priority: resolution tries each in turn and stops at the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    locators: Vec<Locator>,
}

impl LocatorChain {
    /// Panics on an empty list; a chain always has at least one locator.
    pub fn new(locators: Vec<Locator>) -> Self {
        assert!(!locators.is_empty(), "locator chain must not be empty");
        Self { locators }
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, locator) in self.locators.iter().enumerate() {
            if idx > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", locator)?;
        }
        Ok(())
    }
}

/// Embed a selector as a JS string literal. JSON string encoding is valid
/// JavaScript, which covers quotes and backslashes in XPath expressions.
fn js_string_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

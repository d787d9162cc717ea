//! Model catalog: known model ids, display labels and the provider each one routes to.

use relay_core::RelayError;

use crate::provider::ProviderTag;

/// A selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub provider: ProviderTag,
}

const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o",
        label: "GPT-4o",
        provider: ProviderTag::OpenAi,
    },
    ModelInfo {
        id: "gpt-4o-mini",
        label: "GPT-4o mini",
        provider: ProviderTag::OpenAi,
    },
    ModelInfo {
        id: "claude-sonnet-4-20250514",
        label: "Claude Sonnet 4",
        provider: ProviderTag::Claude,
    },
    ModelInfo {
        id: "gemini-2.0-flash",
        label: "Gemini 2.0 Flash",
        provider: ProviderTag::Gemini,
    },
    ModelInfo {
        id: "gemini-1.5-pro",
        label: "Gemini 1.5 Pro",
        provider: ProviderTag::Gemini,
    },
];

/// Catalog with a configured default.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    default: ModelInfo,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self { default: MODELS[0] }
    }
}

impl ModelCatalog {
    /// Catalog whose default is `default_id`. Fails with `UnknownModel` if the id is not listed.
    pub fn with_default(default_id: &str) -> Result<Self, RelayError> {
        let default = Self::lookup(default_id)?;
        Ok(Self { default })
    }

    /// Catalog whose default is the first listed model whose provider is `available`.
    pub fn first_available(available: impl Fn(ProviderTag) -> bool) -> Option<Self> {
        MODELS
            .iter()
            .find(|m| available(m.provider))
            .map(|&default| Self { default })
    }

    fn lookup(id: &str) -> Result<ModelInfo, RelayError> {
        MODELS
            .iter()
            .find(|m| m.id == id)
            .copied()
            .ok_or_else(|| RelayError::UnknownModel(id.to_string()))
    }

    pub fn all(&self) -> &'static [ModelInfo] {
        MODELS
    }

    pub fn default_model(&self) -> ModelInfo {
        self.default
    }

    /// Resolves an optional model id; `None` selects the default.
    pub fn find(&self, id: Option<&str>) -> Result<ModelInfo, RelayError> {
        match id {
            None => Ok(self.default),
            Some(id) => Self::lookup(id),
        }
    }
}

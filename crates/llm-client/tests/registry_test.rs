//! Integration tests for provider wiring from [`llm_client::EnvLlmConfig`].
//!
//! Covers: one provider per configured key, unsupported routing for missing keys, and model → provider
//! resolution through the catalog.

use llm_client::{build_registry, EnvLlmConfig, ModelCatalog, ProviderCredentials, ProviderTag};
use relay_core::RelayError;

fn creds(key: &str) -> Option<ProviderCredentials> {
    Some(ProviderCredentials {
        api_key: key.to_string(),
        base_url: "http://localhost:4000/v1".to_string(),
    })
}

fn config(openai: bool, gemini: bool, claude: bool) -> EnvLlmConfig {
    EnvLlmConfig {
        openai: openai.then(|| creds("sk-test-openai-000000")).flatten(),
        gemini: gemini.then(|| creds("gm-test-gemini-000000")).flatten(),
        claude: claude.then(|| creds("sk-ant-test-claude-00")).flatten(),
        default_model: None,
        system_prompt: None,
        moderation_enabled: false,
        max_retries: 0,
    }
}

/// **Test: Only providers with a key are registered.**
#[test]
fn test_registry_follows_configured_keys() {
    let registry = build_registry(&config(true, false, true));
    assert_eq!(registry.tags(), vec![ProviderTag::Claude, ProviderTag::OpenAi]);
}

/// **Test: Selecting a Gemini model without a Gemini key fails with "unsupported provider".**
///
/// **Setup:** OpenAI configured only. **Action:** resolve `gemini-2.0-flash`, route its tag.
/// **Expected:** `UnsupportedProvider("gemini")`.
#[test]
fn test_model_of_unconfigured_provider_is_unsupported() {
    let registry = build_registry(&config(true, false, false));
    let model = ModelCatalog::default().find(Some("gemini-2.0-flash")).unwrap();

    let err = registry.get(model.provider).err().unwrap();
    assert!(matches!(err, RelayError::UnsupportedProvider(ref tag) if tag == "gemini"));
    assert!(err.user_message().contains("Unsupported provider"));
}

/// **Test: A configured provider is routed by its model's tag.**
#[test]
fn test_model_routes_to_registered_provider() {
    let registry = build_registry(&config(false, true, false));
    let model = ModelCatalog::default().find(Some("gemini-1.5-pro")).unwrap();
    let provider = registry.get(model.provider).unwrap();
    assert_eq!(provider.tag(), ProviderTag::Gemini);
}

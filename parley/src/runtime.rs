//! Assembly of a ready-to-serve [`Assistant`] from configuration.

use std::sync::Arc;

use pchat::{
    ChatError, ChatService, ChatTurnRequest, ChatTurnResult, DelegatedRouter,
    InMemoryConversationStore, KeywordRouter, KeywordRules, RouterMode, TurnHooks, TurnRouter,
};
use pcommon::SessionId;
use pobserve::{Guarded, Telemetry};
use pprovider::{ModelProvider, ProviderId, ProviderOperationHooks, RetryPolicy};
use pservices::{
    Clock, SearchService, SystemClock, TavilySearchClient, WeatherService, WttrWeatherClient,
    assistant_tools,
};
use ptooling::{DefaultToolRuntime, ToolRuntimeHooks};

use crate::config::{ConfigError, ConfigErrorKind, Credentials, ParleyConfig};

/// The external services one assistant talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub weather: Arc<dyn WeatherService>,
    pub search: Arc<dyn SearchService>,
    pub provider: Arc<dyn ModelProvider>,
}

/// Presentation boundary: `(session, text) -> reply`.
#[derive(Clone)]
pub struct Assistant {
    service: ChatService,
}

impl Assistant {
    /// Builds the HTTP-backed collaborators and wires them with telemetry.
    pub fn from_config(config: &ParleyConfig, credentials: Credentials) -> Result<Self, ConfigError> {
        let telemetry = Arc::new(Guarded::new(Telemetry::default()));
        let provider = build_provider(config, &credentials, telemetry.clone())?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| ConfigError::invalid_value("http client", err))?;
        let collaborators = Collaborators {
            clock: Arc::new(SystemClock::new(config.timezone)),
            weather: Arc::new(WttrWeatherClient::new(http.clone())),
            search: Arc::new(TavilySearchClient::new(http, credentials.search_api_key)),
            provider,
        };

        Ok(Self::assemble_with_hooks(
            config,
            collaborators,
            telemetry.clone(),
            telemetry,
        ))
    }

    /// Wires `collaborators` without telemetry.
    pub fn assemble(config: &ParleyConfig, collaborators: Collaborators) -> Self {
        Self::assemble_with_hooks(
            config,
            collaborators,
            Arc::new(pchat::NoopTurnHooks),
            Arc::new(ptooling::NoopToolRuntimeHooks),
        )
    }

    fn assemble_with_hooks(
        config: &ParleyConfig,
        collaborators: Collaborators,
        turn_hooks: Arc<dyn TurnHooks>,
        tool_hooks: Arc<dyn ToolRuntimeHooks>,
    ) -> Self {
        let Collaborators {
            clock,
            weather,
            search,
            provider,
        } = collaborators;

        let router: Arc<dyn TurnRouter> = match config.mode {
            RouterMode::Keyword => {
                let rules = KeywordRules::default()
                    .with_default_city(config.default_city.clone())
                    .with_city_extraction(config.weather_city_extraction);
                Arc::new(
                    KeywordRouter::new(clock, weather, search, provider)
                        .with_rules(rules)
                        .with_model_settings(config.model_settings())
                        .with_max_results(config.search_max_results),
                )
            }
            RouterMode::Delegated => {
                let registry =
                    assistant_tools(clock, weather, search, config.search_max_results);
                let tools = DefaultToolRuntime::new(Arc::new(registry)).with_hooks(tool_hooks);
                let mut router = DelegatedRouter::new(provider, Arc::new(tools))
                    .with_model_settings(config.model_settings())
                    .with_max_iterations(config.max_iterations);
                if let Some(prompt) = &config.system_prompt {
                    router = router.with_system_prompt(prompt.clone());
                }
                Arc::new(router)
            }
        };

        let store = Arc::new(InMemoryConversationStore::with_capacity(
            config.history_capacity,
        ));
        let service = ChatService::new(router, store).with_hooks(turn_hooks);

        tracing::info!(
            mode = %config.mode,
            provider = %config.provider,
            model = %config.model,
            history_capacity = config.history_capacity,
            "assistant assembled"
        );
        Self { service }
    }

    pub fn mode(&self) -> RouterMode {
        self.service.mode()
    }

    pub fn service(&self) -> &ChatService {
        &self.service
    }

    pub async fn run_turn(
        &self,
        session_id: impl Into<SessionId>,
        text: impl Into<String>,
    ) -> Result<ChatTurnResult, ChatError> {
        self.service
            .run_turn(ChatTurnRequest::new(session_id, text))
            .await
    }

    /// Reply text for one turn. Only empty input or a store failure is an `Err`.
    pub async fn chat(
        &self,
        session_id: impl Into<SessionId>,
        text: impl Into<String>,
    ) -> Result<String, ChatError> {
        self.run_turn(session_id, text)
            .await
            .map(|result| result.assistant_message)
    }
}

fn build_provider(
    config: &ParleyConfig,
    credentials: &Credentials,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ConfigError> {
    use pprovider::SecureCredentialManager;
    use pprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider, http_client};

    let manager = SecureCredentialManager::with_api_key(
        config.provider,
        credentials.model_api_key.expose(),
    )
    .map_err(|err| ConfigError::new(ConfigErrorKind::MissingCredential, err.message))?;
    let manager = Arc::new(manager);

    let client = http_client(config.model_timeout)
        .map_err(|err| ConfigError::invalid_value("model http client", err))?;
    let retry_policy = RetryPolicy::from_retry_count(config.retry_count);

    let provider: Arc<dyn ModelProvider> = match config.provider {
        ProviderId::Groq => Arc::new(
            groq_provider(config, manager, client)?
                .with_retry_policy(retry_policy)
                .with_hooks(hooks)
                .with_fallback_model(config.model.clone()),
        ),
        ProviderId::OpenAi => {
            let mut transport = OpenAiHttpTransport::new(client);
            if let Some(url) = &config.model_base_url {
                transport = transport.with_base_url(url.clone());
            }
            Arc::new(
                OpenAiProvider::new(manager, Arc::new(transport))
                    .with_retry_policy(retry_policy)
                    .with_hooks(hooks)
                    .with_fallback_model(config.model.clone()),
            )
        }
    };
    Ok(provider)
}

#[cfg(feature = "provider-groq")]
fn groq_provider(
    config: &ParleyConfig,
    manager: Arc<pprovider::SecureCredentialManager>,
    client: reqwest::Client,
) -> Result<pprovider::adapters::groq::GroqProvider, ConfigError> {
    use pprovider::adapters::groq::GroqProvider;

    let mut transport = GroqProvider::default_http_transport(client);
    if let Some(url) = &config.model_base_url {
        transport = transport.with_base_url(url.clone());
    }
    Ok(GroqProvider::new(manager, Arc::new(transport)))
}

#[cfg(not(feature = "provider-groq"))]
fn groq_provider(
    _config: &ParleyConfig,
    _manager: Arc<pprovider::SecureCredentialManager>,
    _client: reqwest::Client,
) -> Result<pprovider::adapters::openai::OpenAiProvider, ConfigError> {
    Err(ConfigError::invalid_value(
        "provider",
        "groq support is not compiled in; enable the provider-groq feature",
    ))
}

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_professors::{OpenAIConfig, PineconeConfig, PromptTemplate};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub openai: OpenAIConfig,
    pub pinecone: PineconeConfig,
    pub prompt: PromptTemplate,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 by default
        let openai = OpenAIConfig::from_env()?; // OPENAI_API_KEY required
        let pinecone = PineconeConfig::from_env()?; // PINECONE_API_KEY required

        let prompt = match std::env::var("SYSTEM_PROMPT_PATH") {
            Ok(path) if !path.trim().is_empty() => PromptTemplate::from_file(path.trim())?,
            _ => PromptTemplate::default(),
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            openai,
            pinecone,
            prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 3] = [
        ("OPENAI_API_KEY", Some("sk-test")),
        ("PINECONE_API_KEY", Some("pc-test")),
        ("SYSTEM_PROMPT_PATH", None),
    ];

    #[test]
    fn test_config_loads_with_required_keys() {
        temp_env::with_vars(REQUIRED, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.app.name, "rmp_api");
            assert_eq!(config.openai.api_key, "sk-test");
            assert_eq!(config.pinecone.index_name, "rag");
            assert_eq!(config.prompt, PromptTemplate::default());
        });
    }

    #[test]
    fn test_config_fails_without_pinecone_key() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("PINECONE_API_KEY", None),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("PINECONE_API_KEY"));
            },
        );
    }

    #[test]
    fn test_config_fails_on_unreadable_prompt_file() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("PINECONE_API_KEY", Some("pc-test")),
                ("SYSTEM_PROMPT_PATH", Some("/no/such/persona.txt")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}

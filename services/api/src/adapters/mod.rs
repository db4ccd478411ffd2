pub mod db;
pub mod generation_llm;
pub mod password;

pub use db::DbAdapter;
pub use generation_llm::OpenAiGenerationAdapter;
pub use password::Argon2Hasher;

#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-groq")]
pub mod groq;

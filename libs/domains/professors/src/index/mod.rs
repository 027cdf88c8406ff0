mod pinecone;
mod provider;

pub use pinecone::{IndexDescription, IndexStatus, PineconeIndex};
pub use provider::VectorIndex;

#[cfg(test)]
pub use provider::MockVectorIndex;

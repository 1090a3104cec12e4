//! A tool-invocation bridge and retrieval-augmented prompt pipeline for
//! delegated agent cores.
//!
//! The crate lets host code define tools, memory, and retrieval stores while
//! an external core owns prompt resolution:
//! - Parameter schemas in any supported notation normalize to one canonical
//!   JSON-Schema text (`ParameterSchema`).
//! - Positional host handlers are marshaled to and from the core's
//!   string/JSON call convention (`ToolSpec`, `CanonicalTool`).
//! - `WindowMemory` keeps a bounded, FIFO-evicting transcript.
//! - `chunk_text` splits long text into bounded, overlap-aware windows.
//! - `VectorStore` mediates save/search/reset against an embedding-indexed
//!   collection.
//! - `Agent` composes the above and delegates to a `DelegateCore`.

mod adapter;
mod agent;
mod chunking;
mod delegate;
mod embeddings;
mod error;
mod extractor;
mod memory;
mod schema;
mod store;
mod tool;

pub use adapter::{tool_spec_from_action, ForeignAction};
pub use agent::Agent;
pub use chunking::{chunk_text, Chunk, Chunks, DEFAULT_CHUNK_SIZE};
pub use delegate::{resolve_handlers, DelegateCore, StubCore};
pub use embeddings::{Embeddings, HashedBucketEmbeddings, RemoteEmbeddings};
pub use error::{BridgeError, Result};
pub use extractor::Extractor;
pub use memory::{
    messages_from_value, messages_to_string, Memory, Message, Role, WindowMemory,
    DEFAULT_WINDOW_SIZE,
};
pub use schema::{
    empty_object_schema, validate, FieldType, ParameterSchema, TypedSchema,
};
pub use store::{
    CollectionConfig, Distance, InMemoryVectorClient, PointMatch, Store, VectorClient,
    VectorPoint, VectorStore, DEFAULT_SCORE_THRESHOLD, DEFAULT_SEARCH_LIMIT,
    DEFAULT_VECTOR_SIZE,
};
pub use tool::{
    coerce_positional, fill_defaults, to_core_handler, CanonicalTool, CoreHandler, ToolHandler,
    ToolSpec,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Rect4Error {
    #[error("Mask has no set pixels")]
    EmptyInput,

    #[error("Degenerate convex hull: {0}")]
    DegenerateHull(String),

    #[error("Hull edge {index} was not assigned to a group")]
    UnassignedEdge { index: usize },

    #[error("Group out of range (edge={index}, group={group}, num_groups={num_groups})")]
    GroupOutOfRange {
        index: usize,
        group: usize,
        num_groups: usize,
    },

    #[error("Supporting lines of consecutive sides {first} and {second} are parallel")]
    ParallelEdges { first: usize, second: usize },

    #[error("Expected a 4-vertex ring, got {vertices} vertices")]
    InvalidRing { vertices: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid no-data definition: {0}")]
    NdvParse(String),

    #[error("No-data definition has {defined} bands but the image has {actual}")]
    NdvBandCount { defined: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, Rect4Error>;

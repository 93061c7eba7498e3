mod artifact;

pub use artifact::MavenCoordinate;

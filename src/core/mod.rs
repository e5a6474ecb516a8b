pub mod fallback;
pub mod normalize;
pub mod pacer;
pub mod paginate;
pub mod persist;
pub mod renamer;
pub mod scanner;

mod nullable;
pub use nullable::Nullable;

mod ternary;
pub use ternary::Ternary;

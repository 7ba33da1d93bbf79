//! Defining if something is null or not so I'm not using a bool everywhere

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nullable {
    Null,
    NotNull,
}

impl From<bool> for Nullable {
    fn from(b: bool) -> Self {
        if b {
            Nullable::Null
        } else {
            Nullable::NotNull
        }
    }
}

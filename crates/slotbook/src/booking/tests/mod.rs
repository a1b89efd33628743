mod common;
mod slots;

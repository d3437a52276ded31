mod helpers;
mod ipn;
mod misc;
mod mocks;

//! Controllers for the managed resource kinds petsync knows about.

pub mod pet;

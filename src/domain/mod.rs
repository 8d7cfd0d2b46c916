/// Domain layer
///
/// - The repository seam over the user store (repository.rs)
/// - One use case per user intent (use_cases.rs)

pub mod repository;
pub mod use_cases;

#[cfg(test)]
pub mod testing;

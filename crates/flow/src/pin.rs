use rand::Rng;

/// Generate a random six-digit verification PIN.
#[must_use]
pub fn generate_pin() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

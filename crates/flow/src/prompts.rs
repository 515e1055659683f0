//! User-facing dialogue copy. All replies are in Spanish; formatting helpers
//! exist for the prompts that interpolate user data.

pub const ASK_REGISTER: &str = "Estimado usuario, no te tenemos registrado en nuestra aplicación.\n¿Deseas registrarte? Responde 'Si' para continuar.";

pub const ASK_EMAIL: &str = "Por favor, proporciona tu correo electrónico para registrarte.";

pub const ASK_NAME: &str = "Gracias. Ahora, por favor proporciónanos tu nombre completo.";

pub const INVALID_EMAIL: &str = "El correo electrónico proporcionado no parece válido. Por favor, ingresa un correo electrónico válido.";

pub const INVALID_NAME: &str = "Por favor, proporciona un nombre válido para continuar.";

pub const PIN_MISMATCH: &str = "El PIN ingresado no es correcto. Por favor, verifica e inténtalo de nuevo.";

pub const ACCOUNT_GONE: &str = "Parece que tu cuenta ya no existe. ¿Deseas registrarte nuevamente?";

/// Inputs accepted as "yes, register me" in the initial state.
pub const AFFIRMATIVES: [&str; 5] = ["si", "sí", "yes", "registrar", "registrarme"];

#[must_use]
pub fn ask_pin(name: &str, email: &str) -> String {
    format!(
        "Gracias, {name}. Hemos enviado un PIN de verificación a tu correo electrónico ({email}). Por favor, ingresa ese PIN para completar tu registro."
    )
}

#[must_use]
pub fn registration_success(name: &str) -> String {
    format!("¡Registro exitoso! Bienvenido, {name}. Ahora puedes utilizar nuestra aplicación.")
}

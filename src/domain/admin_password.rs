use rand::{distributions::Alphanumeric, thread_rng, Rng};
use secrecy::{ExposeSecret, Secret};
use std::iter::repeat_with;

const PASSWORD_LENGTH: usize = 16;

/// Initial password of the `administrator` account on a freshly created site.
#[derive(Clone, Debug)]
pub struct AdminPassword(Secret<String>);

impl AdminPassword {
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut thread_rng())
    }

    fn generate_with_rng(rng: &mut impl Rng) -> Self {
        let password = repeat_with(|| rng.sample(Alphanumeric))
            .map(char::from)
            .take(PASSWORD_LENGTH)
            .collect();

        Self(Secret::new(password))
    }
}

impl ExposeSecret<String> for AdminPassword {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}

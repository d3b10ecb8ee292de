//! Account commands.

use qkart_core::{LoginForm, RegistrationForm};
use qkart_storefront::{Action, Notice, Storefront};

use super::{CommandError, During};
use crate::output;

pub async fn register(
    storefront: &Storefront,
    username: String,
    password: String,
    confirm_password: String,
) -> Result<(), CommandError> {
    let form = RegistrationForm::new(username, password, confirm_password);
    let notice = storefront.register(&form).await.during(Action::Register)?;
    output::notice(&notice);
    Ok(())
}

pub async fn login(
    storefront: &mut Storefront,
    username: String,
    password: String,
) -> Result<(), CommandError> {
    let form = LoginForm::new(username, password);
    let notice = storefront.login(&form).await.during(Action::Login)?;
    output::notice(&notice);
    Ok(())
}

pub fn logout(storefront: &mut Storefront) -> Result<(), CommandError> {
    storefront.logout().during(Action::Logout)?;
    output::notice(&Notice::success("Logged out"));
    Ok(())
}

pub fn whoami(storefront: &Storefront) {
    output::whoami(storefront.session().username());
}

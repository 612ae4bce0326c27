use serde::Deserialize;

#[derive(Deserialize)]
pub struct SignupUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateSettings {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

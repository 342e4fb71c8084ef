pub mod users {

    pub const USERNAME_MAX_LEN: usize = 150;

    pub const EMAIL_MAX_LEN: usize = 254;

    pub const NAME_MAX_LEN: usize = 150;

    /// Reserved because `/users/me` is the self-service path.
    pub const RESERVED_USERNAMES: &[&str] = &["me"];
}

pub mod catalog {

    pub const NAME_MAX_LEN: usize = 256;

    pub const SLUG_MAX_LEN: usize = 50;
}

pub mod reviews {

    pub const MIN_SCORE: i32 = 1;

    pub const MAX_SCORE: i32 = 10;
}

pub mod mail {

    pub const CONFIRMATION_SUBJECT: &str = "Confirmation code";
}

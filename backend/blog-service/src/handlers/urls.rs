/// Canonical paths of the pages handlers redirect to.

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", segment(username))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Login page URL with `next` pointing back at the original target.
/// Slashes in `next` stay readable.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", login_url, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect("/auth/login/", "/create/"),
            "/auth/login/?next=/create/"
        );
        assert_eq!(
            login_redirect("/auth/login/", "/posts/1/comment/"),
            "/auth/login/?next=/posts/1/comment/"
        );
        assert_eq!(
            login_redirect("/auth/login/", "/?page=2"),
            "/auth/login/?next=/%3Fpage%3D2"
        );
    }

    #[test]
    fn paths() {
        assert_eq!(profile("test-user"), "/profile/test-user/");
        assert_eq!(post_detail(3), "/posts/3/");
    }
}

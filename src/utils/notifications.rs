use sqlx::PgPool;
use tracing::warn;

use crate::structs::notification::NotificationKind;

/// A notification about to be inserted. `user_id` is the recipient,
/// `actor_id` the user whose action triggered it.
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: i64,
    pub actor_id: i64,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
}

impl NewNotification {
    pub fn like(recipient: i64, actor_id: i64, actor_name: &str, post_id: i64, post_title: &str) -> Self {
        Self {
            kind: NotificationKind::Like,
            title: "New like".to_string(),
            message: format!("{actor_name} liked your post \"{post_title}\"."),
            user_id: recipient,
            actor_id,
            post_id: Some(post_id),
            comment_id: None,
        }
    }

    pub fn comment(
        recipient: i64,
        actor_id: i64,
        actor_name: &str,
        post_id: i64,
        post_title: &str,
        comment_id: i64,
    ) -> Self {
        Self {
            kind: NotificationKind::Comment,
            title: "New comment".to_string(),
            message: format!("{actor_name} commented on your post \"{post_title}\"."),
            user_id: recipient,
            actor_id,
            post_id: Some(post_id),
            comment_id: Some(comment_id),
        }
    }

    pub fn profile_view(recipient: i64, actor_id: i64, actor_name: &str) -> Self {
        Self {
            kind: NotificationKind::ProfileView,
            title: "Profile view".to_string(),
            message: format!("{actor_name} viewed your profile."),
            user_id: recipient,
            actor_id,
            post_id: None,
            comment_id: None,
        }
    }
}

/// Best-effort insert : a failed notification is logged and never fails the
/// action that triggered it. Self-notifications are skipped here so call
/// sites cannot forget the rule.
pub async fn notify_best_effort(pool: &PgPool, notification: NewNotification) {
    if notification.user_id == notification.actor_id {
        return;
    }

    if let Err(e) = sqlx::query(
        "INSERT INTO notifications (kind, title, message, user_id, actor_id, post_id, comment_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.user_id)
    .bind(notification.actor_id)
    .bind(notification.post_id)
    .bind(notification.comment_id)
    .execute(pool)
    .await
    {
        warn!(
            "Error creating notification for user {} : {e}",
            notification.user_id
        );
    }
}

/// Fan out an INTERESTED_UPDATE to everyone who saved the post, except the
/// author. Single statement, best-effort.
pub async fn notify_interested_users(pool: &PgPool, post_id: i64, author_id: i64, post_title: &str) {
    let message = format!("A post you saved, \"{post_title}\", was updated.");

    if let Err(e) = sqlx::query(
        "INSERT INTO notifications (kind, title, message, user_id, actor_id, post_id)
         SELECT $1, $2, $3, ip.user_id, $4, ip.post_id
         FROM interested_posts ip
         WHERE ip.post_id = $5 AND ip.user_id <> $4",
    )
    .bind(NotificationKind::InterestedUpdate)
    .bind("Saved post updated")
    .bind(&message)
    .bind(author_id)
    .bind(post_id)
    .execute(pool)
    .await
    {
        warn!("Error notifying interested users of post {post_id} : {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_notification_names_the_liker_and_the_post() {
        let n = NewNotification::like(1, 2, "Bob", 7, "Hello");
        assert_eq!(n.kind, NotificationKind::Like);
        assert_eq!(n.user_id, 1);
        assert_eq!(n.actor_id, 2);
        assert_eq!(n.post_id, Some(7));
        assert_eq!(n.message, "Bob liked your post \"Hello\".");
    }

    #[test]
    fn comment_notification_references_the_comment() {
        let n = NewNotification::comment(1, 2, "Bob", 7, "Hello", 42);
        assert_eq!(n.kind, NotificationKind::Comment);
        assert_eq!(n.comment_id, Some(42));
        assert_eq!(n.message, "Bob commented on your post \"Hello\".");
    }

    #[test]
    fn profile_view_has_no_post_reference() {
        let n = NewNotification::profile_view(1, 2, "Bob");
        assert_eq!(n.kind, NotificationKind::ProfileView);
        assert_eq!(n.post_id, None);
        assert_eq!(n.comment_id, None);
    }
}

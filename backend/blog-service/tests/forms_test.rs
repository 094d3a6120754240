mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use blog_service::db::{comment_repo, post_repo};
use blog_service::handlers;
use common::{location, multipart_body, setup, SMALL_GIF};

#[actix_web::test]
async fn create_post_with_group_and_image() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let group = ctx.group("Тестовая группа", "test-slug").await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let posts_before = ctx.post_count().await;
    let group_id = group.id.to_string();
    let (content_type, body) = multipart_body(
        &[("text", "Тестовый пост"), ("group", &group_id)],
        Some(("image", "small1.gif", SMALL_GIF)),
    );

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/test-user/");
    assert_eq!(ctx.post_count().await, posts_before + 1);

    let post = post_repo::find_post_by_id(&ctx.state.db, 1)
        .await
        .unwrap()
        .expect("created post");
    assert_eq!(post.text, "Тестовый пост");
    assert_eq!(post.author_id, user.id);
    assert_eq!(post.group_id, Some(group.id));
    assert_eq!(post.image.as_deref(), Some("posts/small1.gif"));
    assert!(ctx.media_dir.path().join("posts/small1.gif").exists());
}

#[actix_web::test]
async fn anonymous_create_redirects_to_login() {
    let ctx = setup().await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "Гостевой пост")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn empty_text_is_rejected() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "   ")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["is_edit"], false);
    assert_eq!(body["form"]["errors"]["text"][0], "This field is required.");
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn unknown_group_is_rejected() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "Текст"), ("group", "999")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["form"]["errors"]["group"].is_array());
    assert_eq!(body["form"]["text"], "Текст");
    assert_eq!(ctx.post_count().await, 0);
}

#[actix_web::test]
async fn unusable_image_name_is_a_form_error() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "hello")], Some(("image", "!!!", SMALL_GIF)));
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["form"]["errors"]["image"].is_array());
    assert_eq!(body["form"]["text"], "hello");
    assert_eq!(ctx.post_count().await, 0);
    assert!(!ctx.media_dir.path().join("posts").exists());
}

#[actix_web::test]
async fn author_edits_post() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let group = ctx.group("Тестовая группа", "test-slug").await;
    let other_group = ctx.group("Другая группа", "other-slug").await;
    let post = ctx.post(&user, "Старый текст", Some(&group)).await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let group_id = other_group.id.to_string();
    let (content_type, body) = multipart_body(
        &[("text", "Отредактированный пост"), ("group", &group_id)],
        Some(("image", "small2.gif", SMALL_GIF)),
    );
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert_eq!(ctx.post_count().await, 1);

    let edited = post_repo::find_post_by_id(&ctx.state.db, post.id)
        .await
        .unwrap()
        .expect("edited post");
    assert_eq!(edited.text, "Отредактированный пост");
    assert_eq!(edited.group_id, Some(other_group.id));
    assert_eq!(edited.image.as_deref(), Some("posts/small2.gif"));
}

#[actix_web::test]
async fn edit_without_image_keeps_existing_one() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let post = post_repo::insert_post(
        &ctx.state.db,
        user.id,
        "С картинкой",
        None,
        Some("posts/kept.gif"),
        chrono::Utc::now(),
    )
    .await
    .unwrap();
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "Новый текст")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.auth_header(&user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let edited = post_repo::find_post_by_id(&ctx.state.db, post.id)
        .await
        .unwrap()
        .expect("edited post");
    assert_eq!(edited.text, "Новый текст");
    assert_eq!(edited.group_id, None);
    assert_eq!(edited.image.as_deref(), Some("posts/kept.gif"));
}

#[actix_web::test]
async fn non_author_cannot_edit_post() {
    let ctx = setup().await;
    let author = ctx.user("test-user").await;
    let stranger = ctx.user("stranger").await;
    let post = ctx.post(&author, "Исходный текст", None).await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let (content_type, body) = multipart_body(&[("text", "Чужая правка")], None);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.auth_header(&stranger))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let unchanged = post_repo::find_post_by_id(&ctx.state.db, post.id)
        .await
        .unwrap()
        .expect("post");
    assert_eq!(unchanged.text, "Исходный текст");
}

#[actix_web::test]
async fn authorized_user_adds_comment() {
    let ctx = setup().await;
    let author = ctx.user("test-user").await;
    let commenter = ctx.user("commenter").await;
    let post = ctx.post(&author, "Пост для комментариев", None).await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .insert_header(ctx.auth_header(&commenter))
            .set_form([("text", "Тестовый комментарий")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert_eq!(comment_repo::count_comments(&ctx.state.db).await.unwrap(), 1);

    let comments = comment_repo::find_comments_by_post(&ctx.state.db, post.id)
        .await
        .unwrap();
    assert_eq!(comments[0].text, "Тестовый комментарий");
    assert_eq!(comments[0].author, "commenter");
}

#[actix_web::test]
async fn guest_comment_redirects_to_login() {
    let ctx = setup().await;
    let author = ctx.user("test-user").await;
    let post = ctx.post(&author, "Пост", None).await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .set_form([("text", "Гостевой комментарий")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("/auth/login/?next=/posts/{}/comment/", post.id)
    );
    assert_eq!(comment_repo::count_comments(&ctx.state.db).await.unwrap(), 0);
}

#[actix_web::test]
async fn blank_comment_is_rejected() {
    let ctx = setup().await;
    let author = ctx.user("test-user").await;
    let post = ctx.post(&author, "Пост", None).await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .insert_header(ctx.auth_header(&author))
            .set_form([("text", "")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(comment_repo::count_comments(&ctx.state.db).await.unwrap(), 0);
}

#[actix_web::test]
async fn comment_on_missing_post_is_not_found() {
    let ctx = setup().await;
    let user = ctx.user("test-user").await;
    let app = test::init_service(App::new().app_data(ctx.data()).configure(handlers::configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/42/comment/")
            .insert_header(ctx.auth_header(&user))
            .set_form([("text", "В пустоту")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

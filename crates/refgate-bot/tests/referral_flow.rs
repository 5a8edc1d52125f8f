//! End-to-end referral flows against a mocked Bot API.

use mockito::{Matcher, Mock, ServerGuard};
use refgate_bot::telegram::{Chat, Message, Update, User};
use refgate_bot::{BotConfig, BotNode};
use refgate_ledger::UserId;
use serde_json::json;

const SENT: &str = r#"{"ok":true,"result":{"message_id":1,"chat":{"id":1,"type":"private"}}}"#;

async fn server_with_bot(member_status: &str) -> ServerGuard {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTOKEN/getMe")
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"id":1,"is_bot":true,"first_name":"Ref","username":"ref_bot"}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/botTOKEN/getChatMember")
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"ok":true,"result":{{"status":"{}"}}}}"#, member_status))
        .create_async()
        .await;
    server
}

async fn expect_send(server: &mut ServerGuard, chat_id: i64, pattern: &str, times: usize) -> Mock {
    server
        .mock("POST", "/botTOKEN/sendMessage")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "chat_id": chat_id })),
            Matcher::Regex(pattern.to_string()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(SENT)
        .expect(times)
        .create_async()
        .await
}

fn config(server: &ServerGuard, extra: &[(&str, String)]) -> BotConfig {
    let mut vars = vec![
        ("BOT_TOKEN", "TOKEN".to_string()),
        ("CHANNEL_USERNAME", "@refchan".to_string()),
        ("REWARD_TEXT", "REWARD".to_string()),
        ("TELEGRAM_API_URL", server.url()),
    ];
    vars.extend(extra.iter().cloned());
    BotConfig::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn start_update(update_id: i64, user: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            from: Some(User {
                id: user,
                is_bot: false,
                first_name: "Ann".into(),
                username: None,
            }),
            chat: Chat {
                id: user,
                kind: "private".into(),
            },
            text: Some(text.into()),
        }),
    }
}

async fn process(node: &BotNode, update: Update) {
    for handle in node.process(update).await {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn member_start_credits_inviter_and_welcomes_actor() {
    let mut server = server_with_bot("member").await;
    let reply = expect_send(&mut server, 5, r"start=5", 1).await;
    let progress = expect_send(&mut server, 12345, r"Total: 1/3", 1).await;

    let node = BotNode::new(config(&server, &[])).await.unwrap();
    assert_eq!(node.bot_username(), "ref_bot");

    process(&node, start_update(1, 5, "/start 12345")).await;

    assert_eq!(node.ledger().count(UserId::new(12345)).unwrap(), 1);
    reply.assert_async().await;
    progress.assert_async().await;
}

#[tokio::test]
async fn non_member_is_prompted_and_not_credited() {
    let mut server = server_with_bot("left").await;
    let prompt = expect_send(&mut server, 5, r"Join @refchan first", 1).await;
    let progress = expect_send(&mut server, 12345, r".*", 0).await;

    let node = BotNode::new(config(&server, &[])).await.unwrap();
    process(&node, start_update(1, 5, "/start 12345")).await;

    assert_eq!(node.ledger().count(UserId::new(12345)).unwrap(), 0);
    prompt.assert_async().await;
    progress.assert_async().await;
}

#[tokio::test]
async fn reward_sent_exactly_once() {
    let mut server = server_with_bot("member").await;
    let _replies = expect_send(&mut server, 1, r".*", 1).await;
    let _replies2 = expect_send(&mut server, 2, r".*", 1).await;
    let _replies3 = expect_send(&mut server, 3, r".*", 1).await;
    let progress = expect_send(&mut server, 100, r"Total", 3).await;
    let reward = expect_send(&mut server, 100, r"REWARD", 1).await;

    let node = BotNode::new(config(&server, &[("REF_TARGET", "2".into())]))
        .await
        .unwrap();

    process(&node, start_update(1, 1, "/start 100")).await;
    process(&node, start_update(2, 2, "/start 100")).await;
    process(&node, start_update(3, 3, "/start 100")).await;

    assert_eq!(node.ledger().count(UserId::new(100)).unwrap(), 3);
    progress.assert_async().await;
    reward.assert_async().await;
}

#[tokio::test]
async fn check_reports_zero_for_unknown_user() {
    let mut server = server_with_bot("member").await;
    let reply = expect_send(&mut server, 9, r"0/3 valid referrals", 1).await;

    let node = BotNode::new(config(&server, &[])).await.unwrap();
    process(&node, start_update(1, 9, "/check")).await;

    reply.assert_async().await;
    assert!(!node.ledger().has_record(UserId::new(9)).unwrap());
}

#[tokio::test]
async fn plain_text_is_ignored() {
    let mut server = server_with_bot("member").await;
    let reply = expect_send(&mut server, 5, r".*", 0).await;

    let node = BotNode::new(config(&server, &[])).await.unwrap();
    process(&node, start_update(1, 5, "hello there")).await;
    process(&node, start_update(2, 5, "/check@other_bot")).await;

    reply.assert_async().await;
}

#[tokio::test]
async fn durable_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("ledger").to_string_lossy().into_owned();

    let mut server = server_with_bot("member").await;
    let _reply = expect_send(&mut server, 5, r".*", 1).await;
    let _progress = expect_send(&mut server, 12345, r".*", 1).await;

    {
        let node = BotNode::new(config(&server, &[("REFGATE_DATA_DIR", data_dir.clone())]))
            .await
            .unwrap();
        process(&node, start_update(1, 5, "/start 12345")).await;
    }

    let node = BotNode::new(config(&server, &[("REFGATE_DATA_DIR", data_dir)]))
        .await
        .unwrap();
    assert_eq!(node.ledger().count(UserId::new(12345)).unwrap(), 1);
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::aggregate::ChatThread;
use crate::shared::api_error::ServiceError;
use crate::shared::state_cell::StateCell;
use crate::system::auth::IdentityProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

/// Remote question-answering service over the analysed documents.
#[async_trait(?Send)]
pub trait ChatService {
    async fn ask(&self, request: &ChatRequest, credential: &str)
        -> Result<ChatResponse, ServiceError>;
}

/// Send one message through the thread's single-flight guard.
///
/// Returns false when nothing was dispatched (blank input or a send already
/// outstanding). Failures end up in the thread as an assistant message.
pub async fn send_message<C, I, S>(cell: &C, identity: &I, service: &S, text: &str) -> bool
where
    C: StateCell<ChatThread>,
    I: IdentityProvider + ?Sized,
    S: ChatService + ?Sized,
{
    let Some(query) = cell.update_with(|t| t.begin_send(text)).flatten() else {
        return false;
    };

    let result = async {
        let credential = identity.id_token().await?;
        service.ask(&ChatRequest { query }, &credential).await
    }
    .await;

    let outcome = match result {
        Ok(response) => Ok(response.answer),
        Err(e) => {
            log::warn!("chat request failed: {e}");
            Err(e.to_string())
        }
    };
    cell.update_with(|t| t.finish_send(outcome));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_chat_thread::aggregate::ChatRole;
    use crate::shared::api_error::ErrorFields;
    use crate::system::auth::AuthUser;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct MockIdentity;

    #[async_trait(?Send)]
    impl IdentityProvider for MockIdentity {
        fn current_user(&self) -> Option<AuthUser> {
            Some(AuthUser {
                uid: "user-1".into(),
                email: None,
            })
        }

        async fn id_token(&self) -> Result<String, ServiceError> {
            Ok("token".into())
        }
    }

    struct MockChat {
        calls: Cell<usize>,
        result: Result<ChatResponse, ServiceError>,
    }

    impl MockChat {
        fn answering(answer: &str) -> Self {
            Self {
                calls: Cell::new(0),
                result: Ok(ChatResponse {
                    answer: Some(answer.into()),
                }),
            }
        }
    }

    #[async_trait(?Send)]
    impl ChatService for MockChat {
        async fn ask(
            &self,
            request: &ChatRequest,
            credential: &str,
        ) -> Result<ChatResponse, ServiceError> {
            assert_eq!(credential, "token");
            assert!(!request.query.is_empty());
            self.calls.set(self.calls.get() + 1);
            // Stay pending for a turn so other sends can interleave.
            tokio::task::yield_now().await;
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let cell = Rc::new(RefCell::new(ChatThread::new()));
        let service = MockChat::answering("### Explanation\n- it works");
        assert!(send_message(&cell, &MockIdentity, &service, "does it work?").await);

        let thread = cell.borrow();
        let messages = thread.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "does it work?");
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert_eq!(messages[1].content, "### Explanation\n- it works");
        assert!(!thread.is_sending());
    }

    #[tokio::test]
    async fn test_rapid_second_send_is_noop() {
        let cell = Rc::new(RefCell::new(ChatThread::new()));
        let service = MockChat::answering("answer");
        let (first, second) = tokio::join!(
            send_message(&cell, &MockIdentity, &service, "first"),
            send_message(&cell, &MockIdentity, &service, "second"),
        );

        assert_eq!([first, second].iter().filter(|sent| **sent).count(), 1);
        assert_eq!(service.calls.get(), 1);
        assert_eq!(cell.borrow().messages().len(), 2);

        assert!(send_message(&cell, &MockIdentity, &service, "third").await);
        assert_eq!(service.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_call() {
        let cell = Rc::new(RefCell::new(ChatThread::new()));
        let service = MockChat::answering("answer");
        assert!(!send_message(&cell, &MockIdentity, &service, "  ").await);
        assert_eq!(service.calls.get(), 0);
        assert!(cell.borrow().messages().is_empty());
    }

    #[tokio::test]
    async fn test_failure_becomes_assistant_message() {
        let cell = Rc::new(RefCell::new(ChatThread::new()));
        let service = MockChat {
            calls: Cell::new(0),
            result: Err(ServiceError::rejected(
                500,
                "{}",
                ErrorFields::DetailOnly,
                "Chat request failed",
            )),
        };
        send_message(&cell, &MockIdentity, &service, "hello").await;

        let thread = cell.borrow();
        assert_eq!(thread.messages()[1].role, ChatRole::Assistant);
        assert_eq!(thread.messages()[1].content, "Chat request failed");
        assert!(!thread.is_sending());
    }
}

//! The service layer emits its named spans.

use std::sync::Arc;

use anyhow::Result;
use mock::MockTodosRepository;
use tracing_test::traced_test;

use todos::contract::model::NewTodo;
use todos::domain::service::{Service, ServiceConfig};

mod mock {
    use std::sync::Mutex;

    use anyhow::Result;
    use todos::contract::model::{NewTodo, Todo};
    use todos::domain::repo::TodosRepository;

    #[derive(Default)]
    pub struct MockTodosRepository {
        pub todos: Mutex<Vec<Todo>>,
    }

    #[async_trait::async_trait]
    impl TodosRepository for MockTodosRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<Todo>> {
            Ok(self.todos.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn insert(&self, new_todo: NewTodo) -> Result<Todo> {
            let mut todos = self.todos.lock().unwrap();
            let todo = Todo {
                id: todos.len() as i32 + 1,
                title: new_todo.title,
                body: new_todo.body,
            };
            todos.push(todo.clone());
            Ok(todo)
        }

        async fn list(&self) -> Result<Vec<Todo>> {
            Ok(self.todos.lock().unwrap().clone())
        }
    }
}

fn service() -> Service {
    Service::new(
        Arc::new(MockTodosRepository::default()),
        ServiceConfig::default(),
    )
}

#[tokio::test]
#[traced_test]
async fn create_todo_emits_span() -> Result<()> {
    service()
        .create_todo(NewTodo {
            title: "first todo".into(),
            body: "a body here".into(),
        })
        .await?;

    assert!(logs_contain("todos.service.create_todo"));
    assert!(logs_contain("Created todo"));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn get_todo_span_carries_the_id() {
    let _ = service().get_todo(5).await;

    assert!(logs_contain("todos.service.get_todo"));
    assert!(logs_contain("id=5"));
}

#[tokio::test]
async fn long_titles_are_rejected() {
    let svc = Service::new(
        Arc::new(MockTodosRepository::default()),
        ServiceConfig { max_title_length: 5 },
    );
    let err = svc
        .create_todo(NewTodo {
            title: "too long".into(),
            body: String::new(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no more than 5 characters"));
}

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use serde_json::Value;

use tasklist::error::AppError;
use tasklist::form::TodoForm;
use tasklist::guard::{self, Access};
use tasklist::models::{Registration, Todo};
use tasklist::todos::TodoList;
use tasklist::App;

#[derive(Debug, Parser)]
#[command(name = "tasklist", about = "Manage your personal task list")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged in user
    Whoami,
    /// List all todos
    List,
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        completed: bool,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip the completed state of a todo
    Toggle { id: String },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Runs one command. The error is the message to show the user.
pub async fn run(command: Command, mut app: App) -> Result<(), String> {
    match command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let registration = Registration {
                name,
                email,
                password,
            };
            app.session
                .register(&registration)
                .await
                .map_err(|e| e.to_string())?;
            println!("Account created, you can now login");
        }
        Command::Login { email, password } => {
            let session = app
                .session
                .login(&email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("Logged in as {}", display_user(&session.user));
        }
        Command::Logout => {
            app.session.logout();
            println!("Logged out");
        }
        Command::Whoami => match app.session.current_user() {
            Some(session) => println!("{}", display_user(&session.user)),
            None => println!("Not logged in"),
        },
        command => {
            if let Access::Deny { redirect_to } = guard::can_activate(&app.session) {
                return Err(format!(
                    "Please login first (tasklist login, {})",
                    redirect_to.path()
                ));
            }
            run_todo_command(command, &mut app.todos).await?;
        }
    }
    Ok(())
}

async fn run_todo_command(command: Command, todos: &mut TodoList) -> Result<(), String> {
    match command {
        Command::List => {
            load(todos).await?;
            if todos.todos().is_empty() {
                println!("No todos yet");
            }
            for todo in todos.todos() {
                print_todo(todo);
            }
        }
        Command::Add {
            title,
            description,
            completed,
        } => {
            let mut form = TodoForm::new();
            form.title = title;
            form.description = description.unwrap_or_default();
            form.completed = completed;
            let todo = submit(todos, &mut form).await?;
            println!("Added:");
            print_todo(&todo);
        }
        Command::Edit {
            id,
            title,
            description,
            completed,
        } => {
            let existing = find(todos, &id).await?;
            let mut form = TodoForm::edit(&existing);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(completed) = completed {
                form.completed = completed;
            }
            let todo = submit(todos, &mut form).await?;
            println!("Updated:");
            print_todo(&todo);
        }
        Command::Toggle { id } => {
            let existing = find(todos, &id).await?;
            let todo = todos
                .toggle_complete(&existing)
                .await
                .map_err(|e| view_error(todos, &e))?;
            print_todo(&todo);
        }
        Command::Delete { id, yes } => {
            let existing = find(todos, &id).await?;
            let deleted = todos
                .confirm_delete(existing.id.as_deref(), || {
                    yes || confirm("Are you sure you want to delete this todo?")
                })
                .await
                .map_err(|e| view_error(todos, &e))?;
            if deleted {
                println!("Deleted {}", existing.title);
            }
        }
        _ => {}
    }
    Ok(())
}

async fn load(todos: &mut TodoList) -> Result<(), String> {
    todos.load().await.map_err(|e| view_error(todos, &e))
}

async fn find(todos: &mut TodoList, id: &str) -> Result<Todo, String> {
    load(todos).await?;
    todos
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound.to_string())
}

async fn submit(todos: &mut TodoList, form: &mut TodoForm) -> Result<Todo, String> {
    todos.submit(form).await.map_err(|e| {
        form.error
            .clone()
            .unwrap_or_else(|| e.to_string())
    })
}

fn view_error(todos: &TodoList, err: &AppError) -> String {
    todos
        .error()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    println!(
        "[{mark}] {} ({})",
        todo.title,
        todo.id.as_deref().unwrap_or("unsaved")
    );
    if let Some(description) = &todo.description {
        println!("    {description}");
    }
}

fn display_user(user: &Value) -> String {
    ["name", "email"]
        .iter()
        .find_map(|key| user.get(*key)?.as_str())
        .unwrap_or("unknown user")
        .to_string()
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    io::stdin().read_line(&mut answer).is_ok()
        && matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}

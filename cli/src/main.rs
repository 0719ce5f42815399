use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use daybook::contacts::ContactManager;
use daybook::finance::{FinanceManager, FinanceRecord, RecordFilter};
use daybook::notes::NoteManager;
use daybook::tasks::{Priority, Task, TaskFilter, TaskManager};

fn main() {
    env_logger::init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut notes = NoteManager::open(data_dir.join("notes.json"));
    let mut tasks = TaskManager::open(data_dir.join("tasks.json"));
    let mut contacts = ContactManager::open(data_dir.join("contacts.json"));
    let mut finance = FinanceManager::open(data_dir.join("finance.json"));

    loop {
        println!();
        println!("Welcome to daybook!");
        println!("Choose an action:");
        println!("1. Manage notes");
        println!("2. Manage tasks");
        println!("3. Manage contacts");
        println!("4. Manage finance records");
        println!("5. Calculator");
        println!("6. Exit");

        let Some(choice) = prompt("Enter your choice: ") else {
            break;
        };

        let submenu = match choice.as_str() {
            "1" => notes_menu(&mut notes),
            "2" => tasks_menu(&mut tasks),
            "3" => contacts_menu(&mut contacts),
            "4" => finance_menu(&mut finance),
            "5" => calculator(),
            "6" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice, please try again.");
                Some(())
            }
        };

        if submenu.is_none() {
            break;
        }
    }
}

/// Reads one trimmed line from stdin. Returns None on EOF.
fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn calculator() -> Option<()> {
    println!();
    println!("Calculator. Supports +, -, * and / with brackets.");
    println!("Type 'exit' to leave.");

    loop {
        let expr = prompt("Enter an expression: ")?;
        if expr.eq_ignore_ascii_case("exit") {
            return Some(());
        }

        match daybook::calculate(&expr) {
            Ok(result) => println!("Result: {result}"),
            Err(e) => println!("Calculation error: {e}"),
        }
    }
}

fn notes_menu(notes: &mut NoteManager) -> Option<()> {
    loop {
        println!();
        println!("Manage notes:");
        println!("1. Create a note");
        println!("2. List notes");
        println!("3. Show note details");
        println!("4. Edit a note");
        println!("5. Delete a note");
        println!("6. Import notes from CSV");
        println!("7. Export notes to CSV");
        println!("8. Back to the main menu");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => {
                let title = prompt("Enter the note title: ")?;
                let content = prompt("Enter the note content: ")?;
                match notes.create(&title, &content) {
                    Ok(id) => println!("Note {id} created."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "2" => {
                if notes.list().count() == 0 {
                    println!("No notes.");
                } else {
                    println!();
                    println!("Notes:");
                    for note in notes.list() {
                        println!(
                            "ID: {}, Title: {}, Date: {}",
                            note.id, note.title, note.timestamp
                        );
                    }
                }
            }
            "3" => {
                let Some(id) = prompt_id("Enter the note id: ")? else {
                    continue;
                };
                match notes.get(id) {
                    Some(note) => {
                        println!();
                        println!("ID: {}", note.id);
                        println!("Title: {}", note.title);
                        println!("Content: {}", note.content);
                        println!("Last modified: {}", note.timestamp);
                    }
                    None => println!("Note not found."),
                }
            }
            "4" => {
                let Some(id) = prompt_id("Enter the note id to edit: ")? else {
                    continue;
                };
                let title = prompt("Enter the new title: ")?;
                let content = prompt("Enter the new content: ")?;
                match notes.edit(id, &title, &content) {
                    Ok(()) => println!("Note updated."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "5" => {
                let Some(id) = prompt_id("Enter the note id to delete: ")? else {
                    continue;
                };
                match notes.delete(id) {
                    Ok(()) => println!("Note deleted."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "6" => {
                let path = prompt("Enter the CSV file to import: ")?;
                match notes.import_csv(Path::new(&path)) {
                    Ok(count) => println!("Imported {count} notes."),
                    Err(e) => println!("Import error: {e}"),
                }
            }
            "7" => {
                let path = prompt("Enter the CSV file to write: ")?;
                match notes.export_csv(Path::new(&path)) {
                    Ok(()) => println!("Notes exported."),
                    Err(e) => println!("Export error: {e}"),
                }
            }
            "8" => return Some(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn tasks_menu(tasks: &mut TaskManager) -> Option<()> {
    loop {
        println!();
        println!("Manage tasks:");
        println!("1. Add a task");
        println!("2. List tasks");
        println!("3. Mark a task as done");
        println!("4. Edit a task");
        println!("5. Delete a task");
        println!("6. Import tasks from CSV");
        println!("7. Export tasks to CSV");
        println!("8. Filter tasks");
        println!("9. Back to the main menu");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => {
                let title = prompt("Enter the task title: ")?;
                let description = prompt("Enter the task description: ")?;
                let priority = choose_priority()?;
                let due = prompt("Enter the due date (DD-MM-YYYY, empty for none): ")?;
                let due = if due.is_empty() { None } else { Some(due) };
                match tasks.add(&title, &description, priority, due.as_deref()) {
                    Ok(id) => println!("Task {id} added."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "2" => print_tasks(&tasks.list(None)),
            "3" => {
                let Some(id) = prompt_id("Enter the task id to mark: ")? else {
                    continue;
                };
                match tasks.mark_done(id) {
                    Ok(()) => println!("Task marked as done."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "4" => {
                let Some(id) = prompt_id("Enter the task id to edit: ")? else {
                    continue;
                };
                let title = prompt("Enter the new title: ")?;
                let description = prompt("Enter the new description: ")?;
                let priority = choose_priority()?;
                let due = prompt("Enter the new due date (DD-MM-YYYY, empty for none): ")?;
                let due = if due.is_empty() { None } else { Some(due) };
                match tasks.edit(id, &title, &description, priority, due.as_deref()) {
                    Ok(()) => println!("Task updated."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "5" => {
                let Some(id) = prompt_id("Enter the task id to delete: ")? else {
                    continue;
                };
                match tasks.delete(id) {
                    Ok(()) => println!("Task deleted."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "6" => {
                let path = prompt("Enter the CSV file to import: ")?;
                match tasks.import_csv(Path::new(&path)) {
                    Ok(count) => println!("Imported {count} tasks."),
                    Err(e) => println!("Import error: {e}"),
                }
            }
            "7" => {
                let path = prompt("Enter the CSV file to write: ")?;
                match tasks.export_csv(Path::new(&path)) {
                    Ok(()) => println!("Tasks exported."),
                    Err(e) => println!("Export error: {e}"),
                }
            }
            "8" => {
                println!();
                println!("Filter tasks by:");
                println!("1. Status");
                println!("2. Priority");
                println!("3. Due date");
                match prompt("Enter your choice: ")?.as_str() {
                    "1" => {
                        let status = prompt("Enter the status (done/pending): ")?;
                        let done = matches!(
                            status.to_lowercase().as_str(),
                            "done" | "true" | "1"
                        );
                        print_tasks(&tasks.list(Some(&TaskFilter::Status(done))));
                    }
                    "2" => {
                        let text = prompt("Enter the priority (High/Medium/Low): ")?;
                        match Priority::parse(&text) {
                            Some(priority) => {
                                print_tasks(&tasks.list(Some(&TaskFilter::Priority(priority))));
                            }
                            None => println!("Invalid priority, available: High, Medium, Low."),
                        }
                    }
                    "3" => {
                        let date = prompt("Enter the due date (DD-MM-YYYY): ")?;
                        print_tasks(&tasks.list(Some(&TaskFilter::DueDate(date))));
                    }
                    _ => println!("Invalid filter choice."),
                }
            }
            "9" => return Some(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn choose_priority() -> Option<Priority> {
    println!("Choose a priority:");
    for (i, priority) in Priority::ALL.iter().enumerate() {
        println!("{}. {priority}", i + 1);
    }

    Some(match prompt("Enter the priority number: ")?.as_str() {
        "1" => Priority::High,
        "2" => Priority::Medium,
        "3" => Priority::Low,
        _ => {
            println!("Invalid priority choice, using Medium.");
            Priority::Medium
        }
    })
}

fn print_tasks(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!();
    println!("Tasks:");
    for task in tasks {
        let status = if task.done { "Done" } else { "In progress" };
        println!(
            "ID: {}, Title: {}, Status: {}, Priority: {}, Due: {}",
            task.id,
            task.title,
            status,
            task.priority,
            task.due_date.as_deref().unwrap_or("-")
        );
    }
}

fn contacts_menu(contacts: &mut ContactManager) -> Option<()> {
    loop {
        println!();
        println!("Manage contacts:");
        println!("1. Add a contact");
        println!("2. Search contacts");
        println!("3. Edit a contact");
        println!("4. Delete a contact");
        println!("5. Import contacts from CSV");
        println!("6. Export contacts to CSV");
        println!("7. Back to the main menu");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => {
                let name = prompt("Enter the contact name: ")?;
                let phone = prompt("Enter the phone number: ")?;
                let email = prompt("Enter the email: ")?;
                match contacts.add(&name, &phone, &email) {
                    Ok(id) => println!("Contact {id} added."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "2" => {
                let keyword = prompt("Enter a name or phone number to search for: ")?;
                let found = contacts.search(&keyword);
                if found.is_empty() {
                    println!("No contacts found.");
                } else {
                    println!();
                    println!("Search results:");
                    for contact in found {
                        println!(
                            "ID: {}, Name: {}, Phone: {}, Email: {}",
                            contact.id, contact.name, contact.phone, contact.email
                        );
                    }
                }
            }
            "3" => {
                let Some(id) = prompt_id("Enter the contact id to edit: ")? else {
                    continue;
                };
                let name = prompt("Enter the new name: ")?;
                let phone = prompt("Enter the new phone number: ")?;
                let email = prompt("Enter the new email: ")?;
                match contacts.edit(id, &name, &phone, &email) {
                    Ok(()) => println!("Contact updated."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "4" => {
                let Some(id) = prompt_id("Enter the contact id to delete: ")? else {
                    continue;
                };
                match contacts.delete(id) {
                    Ok(()) => println!("Contact deleted."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "5" => {
                let path = prompt("Enter the CSV file to import: ")?;
                match contacts.import_csv(Path::new(&path)) {
                    Ok(count) => println!("Imported {count} contacts."),
                    Err(e) => println!("Import error: {e}"),
                }
            }
            "6" => {
                let path = prompt("Enter the CSV file to write: ")?;
                match contacts.export_csv(Path::new(&path)) {
                    Ok(()) => println!("Contacts exported."),
                    Err(e) => println!("Export error: {e}"),
                }
            }
            "7" => return Some(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn finance_menu(finance: &mut FinanceManager) -> Option<()> {
    loop {
        println!();
        println!("Manage finance records:");
        println!("1. Add a record");
        println!("2. List records");
        println!("3. Generate an activity report");
        println!("4. Show the overall balance");
        println!("5. Import records from CSV");
        println!("6. Export records to CSV");
        println!("7. Back to the main menu");

        match prompt("Enter your choice: ")?.as_str() {
            "1" => {
                let amount = prompt("Enter the amount (positive income, negative expense): ")?;
                let Ok(amount) = amount.parse::<f64>() else {
                    println!("Invalid amount.");
                    continue;
                };
                let category = prompt("Enter the category: ")?;
                let date = prompt("Enter the date (DD-MM-YYYY): ")?;
                let description = prompt("Enter a description: ")?;
                match finance.add(amount, &category, &date, &description) {
                    Ok(id) => println!("Finance record {id} added."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "2" => {
                println!();
                println!("Filter records:");
                println!("1. No filter");
                println!("2. By date");
                println!("3. By category");
                match prompt("Enter your choice: ")?.as_str() {
                    "1" => print_records(&finance.list(None)),
                    "2" => {
                        let date = prompt("Enter the date to filter by (DD-MM-YYYY): ")?;
                        print_records(&finance.list(Some(&RecordFilter::Date(date))));
                    }
                    "3" => {
                        let category = prompt("Enter the category to filter by: ")?;
                        print_records(&finance.list(Some(&RecordFilter::Category(category))));
                    }
                    _ => println!("Invalid filter choice."),
                }
            }
            "3" => {
                let start = prompt("Enter the start date (DD-MM-YYYY): ")?;
                let end = prompt("Enter the end date (DD-MM-YYYY): ")?;
                match finance.report(&start, &end) {
                    Ok(report) => {
                        println!();
                        println!("Report from {start} to {end}:");
                        println!("Total income: {}", report.total_income);
                        println!("Total expense: {}", report.total_expense);
                        println!("Balance: {}", report.balance);
                        println!();
                        println!("By category:");
                        for (category, amount) in &report.by_category {
                            let kind = if *amount > 0.0 { "Income" } else { "Expense" };
                            println!("Category: {category}, Type: {kind}, Amount: {amount}");
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "4" => println!("Overall balance: {}", finance.balance()),
            "5" => {
                let path = prompt("Enter the CSV file to import: ")?;
                match finance.import_csv(Path::new(&path)) {
                    Ok(count) => println!("Imported {count} records."),
                    Err(e) => println!("Import error: {e}"),
                }
            }
            "6" => {
                let path = prompt("Enter the CSV file to write: ")?;
                match finance.export_csv(Path::new(&path)) {
                    Ok(()) => println!("Records exported."),
                    Err(e) => println!("Export error: {e}"),
                }
            }
            "7" => return Some(()),
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn print_records(records: &[&FinanceRecord]) {
    if records.is_empty() {
        println!("No finance records.");
        return;
    }
    println!();
    println!("Finance records:");
    for record in records {
        let kind = if record.is_income() { "Income" } else { "Expense" };
        println!(
            "ID: {}, Type: {}, Amount: {}, Category: {}, Date: {}, Description: {}",
            record.id, kind, record.amount, record.category, record.date, record.description
        );
    }
}

/// Reads an id, reporting invalid input. Outer None is EOF.
fn prompt_id(label: &str) -> Option<Option<u32>> {
    let text = prompt(label)?;
    match text.parse::<u32>() {
        Ok(id) => Some(Some(id)),
        Err(_) => {
            println!("Invalid id.");
            Some(None)
        }
    }
}

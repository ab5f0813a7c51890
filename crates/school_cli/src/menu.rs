//! Numbered console menu.
//!
//! # Responsibility
//! - Read one choice per line, prompt for its arguments, call one service.
//! - Turn service errors into user guidance by `ErrorKind`.
//!
//! # Invariants
//! - A bad input line or a failed service call never ends the loop.
//! - End of input ends the loop like choice 9.

use crate::app::School;
use log::{error, warn};
use school_core::{ErrorKind, NewStudent, ServiceError, Student};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

const MENU: &str = "\
Menu:
1. Find all the groups with less or equal student count
2. Find all the students related to the course with the given name
3. Add a new student
4. Delete a student
5. Add a student to course
6. Remove student from course
7. Find student by ID
8. Add a new student with own id
9. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    GroupsByStudentCount,
    StudentsByCourseName,
    AddStudent,
    DeleteStudent,
    AddToCourse,
    RemoveFromCourse,
    FindStudent,
    AddStudentWithId,
    Exit,
}

fn parse_choice(line: &str) -> Option<Choice> {
    let choice = match line.trim() {
        "1" => Choice::GroupsByStudentCount,
        "2" => Choice::StudentsByCourseName,
        "3" => Choice::AddStudent,
        "4" => Choice::DeleteStudent,
        "5" => Choice::AddToCourse,
        "6" => Choice::RemoveFromCourse,
        "7" => Choice::FindStudent,
        "8" => Choice::AddStudentWithId,
        "9" => Choice::Exit,
        _ => return None,
    };
    Some(choice)
}

/// Why one menu action did not complete.
#[derive(Debug)]
enum ActionError {
    Io(io::Error),
    EndOfInput,
    BadInput(&'static str),
    Service(ServiceError),
}

impl From<io::Error> for ActionError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ServiceError> for ActionError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

type ActionResult = Result<(), ActionError>;

pub struct Menu<'a, 'conn, R, W> {
    school: &'a School<'conn>,
    input: R,
    output: W,
}

impl<'a, 'conn, R: BufRead, W: Write> Menu<'a, 'conn, R, W> {
    pub fn new(school: &'a School<'conn>, input: R, output: W) -> Self {
        Self {
            school,
            input,
            output,
        }
    }

    /// Runs until choice 9 or end of input. Only I/O failures are returned.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            write!(self.output, "Enter choice: ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            let Some(choice) = parse_choice(&line) else {
                writeln!(self.output, "Invalid choice. Please enter 1-9.")?;
                continue;
            };
            if choice == Choice::Exit {
                return Ok(());
            }

            match self.dispatch(choice) {
                Ok(()) => {}
                Err(ActionError::Io(err)) => return Err(err),
                Err(ActionError::EndOfInput) => return Ok(()),
                Err(ActionError::BadInput(hint)) => writeln!(self.output, "{hint}")?,
                Err(ActionError::Service(err)) => self.report(&err)?,
            }
        }
    }

    fn dispatch(&mut self, choice: Choice) -> ActionResult {
        match choice {
            Choice::GroupsByStudentCount => self.groups_by_student_count(),
            Choice::StudentsByCourseName => self.students_by_course_name(),
            Choice::AddStudent => self.add_student(false),
            Choice::DeleteStudent => self.delete_student(),
            Choice::AddToCourse => self.add_to_course(),
            Choice::RemoveFromCourse => self.remove_from_course(),
            Choice::FindStudent => self.find_student(),
            Choice::AddStudentWithId => self.add_student(true),
            Choice::Exit => Ok(()),
        }
    }

    fn groups_by_student_count(&mut self) -> ActionResult {
        let count: i64 = self.ask_number("Enter the maximum student count: ")?;
        let groups = self
            .school
            .groups
            .find_all_groups_with_less_or_equal_student_count(count)?;
        for group in groups {
            writeln!(self.output, "  {}: {}", group.id, group.name)?;
        }
        Ok(())
    }

    fn students_by_course_name(&mut self) -> ActionResult {
        let name = self.ask("Enter the course name: ")?;
        let students = self
            .school
            .students
            .find_all_students_by_course_name(name.trim())?;
        for student in &students {
            writeln!(self.output, "  {}", describe(student))?;
        }
        Ok(())
    }

    fn add_student(&mut self, with_own_id: bool) -> ActionResult {
        let id = if with_own_id {
            Some(self.ask_number("Enter the ID of the student: ")?)
        } else {
            None
        };
        let first_name = self.ask("Enter the first name of the student: ")?;
        let last_name = self.ask("Enter the last name of the student: ")?;
        let group_id = self.ask_optional_number("Enter the ID of the student's group (empty for none): ")?;

        let draft = match id {
            Some(id) => NewStudent::with_id(id, group_id, first_name.trim(), last_name.trim()),
            None => NewStudent::new(group_id, first_name.trim(), last_name.trim()),
        };
        let student = self.school.students.create_student(draft)?;
        writeln!(
            self.output,
            "Student {} has been successfully added with ID {}.",
            student.full_name(),
            student.id
        )?;
        Ok(())
    }

    fn delete_student(&mut self) -> ActionResult {
        let id = self.ask_number("Enter the ID of the student: ")?;
        self.school.students.delete_student(id)?;
        writeln!(self.output, "Student with ID {id} has been deleted.")?;
        Ok(())
    }

    fn add_to_course(&mut self) -> ActionResult {
        let student_id = self.ask_number("Enter the ID of the student: ")?;
        let course_id = self.ask_number("Enter the ID of the course: ")?;
        self.school
            .enrollments
            .add_student_to_course(student_id, course_id)?;
        writeln!(
            self.output,
            "Student with ID {student_id} has been successfully enrolled in course with ID {course_id}."
        )?;
        Ok(())
    }

    fn remove_from_course(&mut self) -> ActionResult {
        let student_id = self.ask_number("Enter the ID of the student: ")?;
        let course_id = self.ask_number("Enter the ID of the course: ")?;
        self.school
            .enrollments
            .remove_student_from_course(student_id, course_id)?;
        writeln!(
            self.output,
            "Student with ID {student_id} has been successfully removed from course with ID {course_id}."
        )?;
        Ok(())
    }

    fn find_student(&mut self) -> ActionResult {
        let id = self.ask_number("Enter the ID of the student: ")?;
        let student = self.school.students.get_student(id)?;
        writeln!(self.output, "  {}", describe(&student))?;
        Ok(())
    }

    fn report(&mut self, err: &ServiceError) -> io::Result<()> {
        match err.kind() {
            ErrorKind::NotFound => writeln!(self.output, "Nothing found: {err}"),
            ErrorKind::InvalidArgument => writeln!(self.output, "Request rejected: {err}"),
            ErrorKind::InconsistentState => {
                warn!("event=menu_action module=cli status=error error_code=inconsistent_state error={err}");
                writeln!(
                    self.output,
                    "The change could not be confirmed; please check the data and retry. ({err})"
                )
            }
            ErrorKind::StorageUnavailable => {
                error!("event=menu_action module=cli status=error error_code=storage_unavailable error={err}");
                writeln!(self.output, "Storage is unavailable: {err}")
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn ask(&mut self, prompt: &str) -> Result<String, ActionError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()?.ok_or(ActionError::EndOfInput)
    }

    fn ask_number<T: FromStr>(&mut self, prompt: &str) -> Result<T, ActionError> {
        self.ask(prompt)?
            .trim()
            .parse()
            .map_err(|_| ActionError::BadInput("Invalid input. Please enter a whole number."))
    }

    fn ask_optional_number<T: FromStr>(&mut self, prompt: &str) -> Result<Option<T>, ActionError> {
        let answer = self.ask(prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        answer
            .parse()
            .map(Some)
            .map_err(|_| ActionError::BadInput("Invalid input. Please enter a whole number."))
    }
}

fn describe(student: &Student) -> String {
    match student.group_id {
        Some(group_id) => format!("{}: {} (group {group_id})", student.id, student.full_name()),
        None => format!("{}: {} (no group)", student.id, student.full_name()),
    }
}

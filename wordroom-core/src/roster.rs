use wordroom_types::Student;

/// Identity lookup. Privilege is global, not per room.
pub trait IdentityProvider: Send + Sync {
    fn find_by_id(&self, id: &str) -> Option<Student>;

    fn is_admin(&self, id: &str) -> bool {
        self.find_by_id(id).map(|s| s.is_admin).unwrap_or(false)
    }
}

/// Static in-memory roster of students.
#[derive(Debug, Clone)]
pub struct StudentRoster {
    students: Vec<Student>,
}

impl StudentRoster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }
}

impl Default for StudentRoster {
    fn default() -> Self {
        let student = |id: &str, name: &str, is_admin: bool| Student {
            id: id.to_string(),
            name: name.to_string(),
            is_admin,
        };

        Self::new(vec![
            student("24310111046", "Ahmet Yılmaz", true),
            student("24310111047", "Mehmet Demir", false),
            student("24310111048", "Ayşe Kaya", false),
            student("24310111049", "Fatma Şahin", false),
            student("24310111050", "Ali Öztürk", true),
        ])
    }
}

impl IdentityProvider for StudentRoster {
    fn find_by_id(&self, id: &str) -> Option<Student> {
        self.students.iter().find(|s| s.id == id).cloned()
    }
}

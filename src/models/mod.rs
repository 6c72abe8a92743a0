pub mod question;

pub use question::{
    ExamPaper, ExamResult, Question, QuestionId, SubmitRequest, SubmitResponse,
};

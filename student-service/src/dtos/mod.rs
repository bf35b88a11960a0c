pub mod students;

pub use students::{
    AddressDto, CreateStudentRequest, CreateStudentResponse, DeleteStudentResponse,
    ListStudentsParams, StudentResponse, UpdateStudentRequest,
};

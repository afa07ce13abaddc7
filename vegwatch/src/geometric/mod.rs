pub mod area_of_interest;
